use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::sequence::{ProFormaDescriptor, ProFormaEvidenceType, ProFormaKey};

/// A tag placed on the sequence, either on a single residue or on a range of residues
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProFormaTag {
    start: usize,
    end: usize,
    descriptors: ThinVec<ProFormaDescriptor>,
    has_ambiguous_sequence: bool,
}

impl ProFormaTag {
    /// Create a new tag on the zero based inclusive range `start..=end`
    pub fn new(
        start: usize,
        end: usize,
        descriptors: impl IntoIterator<Item = ProFormaDescriptor>,
    ) -> Self {
        Self {
            start,
            end,
            descriptors: descriptors.into_iter().collect(),
            has_ambiguous_sequence: false,
        }
    }

    /// Create a new tag on a single residue
    pub fn single(index: usize, descriptors: impl IntoIterator<Item = ProFormaDescriptor>) -> Self {
        Self::new(index, index, descriptors)
    }

    /// Set if the residues of this range are themselves unknown (`(?DQ)`)
    #[must_use]
    pub const fn with_ambiguous_sequence(mut self, ambiguous: bool) -> Self {
        self.has_ambiguous_sequence = ambiguous;
        self
    }

    /// The zero based start index
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The zero based end index (inclusive)
    pub const fn end(&self) -> usize {
        self.end
    }

    /// The descriptors of this tag
    pub fn descriptors(&self) -> &[ProFormaDescriptor] {
        &self.descriptors
    }

    /// If the residues of this range are themselves unknown
    pub const fn has_ambiguous_sequence(&self) -> bool {
        self.has_ambiguous_sequence
    }

    /// Check if this tag is written as a range
    pub const fn is_range(&self) -> bool {
        self.start != self.end || self.has_ambiguous_sequence
    }
}

/// A single candidate location of a tag group
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct ProFormaMembershipDescriptor {
    /// The zero based start index
    pub start: usize,
    /// The zero based end index (inclusive)
    pub end: usize,
    /// The localisation score, 0.0 means unscored
    pub weight: OrderedFloat<f64>,
}

impl ProFormaMembershipDescriptor {
    /// Create a membership for a single residue without a score
    pub const fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
            weight: OrderedFloat(0.0),
        }
    }

    /// Check if this membership spans more than one residue
    pub const fn is_range(&self) -> bool {
        self.start != self.end
    }
}

/// A modification that is placed on one of multiple candidate locations, eg `EM[Oxidation#g1]EVEM[#g1]K`
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProFormaTagGroup {
    name: String,
    descriptor: ProFormaDescriptor,
    memberships: Vec<ProFormaMembershipDescriptor>,
    preferred_location: usize,
}

impl ProFormaTagGroup {
    /// Create a new tag group, the preferred location is the index into the memberships where
    /// the descriptor is written.
    pub fn new(
        name: impl Into<String>,
        descriptor: ProFormaDescriptor,
        memberships: Vec<ProFormaMembershipDescriptor>,
        preferred_location: usize,
    ) -> Self {
        Self {
            name: name.into(),
            descriptor,
            memberships,
            preferred_location,
        }
    }

    /// The group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The modification of this group
    pub const fn descriptor(&self) -> &ProFormaDescriptor {
        &self.descriptor
    }

    /// The key of the modification
    pub const fn key(&self) -> ProFormaKey {
        self.descriptor.key()
    }

    /// The evidence type of the modification
    pub const fn evidence_type(&self) -> ProFormaEvidenceType {
        self.descriptor.evidence_type()
    }

    /// The value of the modification
    pub fn value(&self) -> &str {
        self.descriptor.value()
    }

    /// All candidate locations
    pub fn memberships(&self) -> &[ProFormaMembershipDescriptor] {
        &self.memberships
    }

    /// The index into [`Self::memberships`] of the location that carries the modification value
    pub const fn preferred_location(&self) -> usize {
        self.preferred_location
    }
}

/// A tag that is known to be on the proteoform but not on which residue, eg `[Phospho]^2?`
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProFormaUnlocalizedTag {
    /// The descriptors
    pub descriptors: ThinVec<ProFormaDescriptor>,
    /// The number of times this tag occurs, at least one
    pub count: u32,
}

impl ProFormaUnlocalizedTag {
    /// Create a new unlocalized tag
    pub fn new(descriptors: impl IntoIterator<Item = ProFormaDescriptor>, count: u32) -> Self {
        Self {
            descriptors: descriptors.into_iter().collect(),
            count,
        }
    }
}

/// A modification that applies to the whole proteoform, either a fixed modification on all
/// residues of the given types (`<[Carbamidomethyl]@C>`) or an isotope label (`<13C>`)
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProFormaGlobalModification {
    /// The descriptors, for an isotope label this is a single key-less descriptor with the label
    pub descriptors: ThinVec<ProFormaDescriptor>,
    /// The residues this modification is placed on, None for isotope labels
    pub target_residues: Option<ThinVec<char>>,
}

impl ProFormaGlobalModification {
    /// Create a fixed modification on all given residues
    pub fn fixed(
        descriptors: impl IntoIterator<Item = ProFormaDescriptor>,
        target_residues: impl IntoIterator<Item = char>,
    ) -> Self {
        Self {
            descriptors: descriptors.into_iter().collect(),
            target_residues: Some(target_residues.into_iter().collect()),
        }
    }

    /// Create an isotope label, eg `13C` or `D`
    pub fn isotope(label: impl Into<String>) -> Self {
        Self {
            descriptors: thin_vec::thin_vec![ProFormaDescriptor::new(
                ProFormaKey::None,
                ProFormaEvidenceType::None,
                label
            )],
            target_residues: None,
        }
    }

    /// The isotope label if this is an isotope label
    pub fn isotope_label(&self) -> Option<&str> {
        if self.target_residues.is_none() {
            self.descriptors.first().map(ProFormaDescriptor::value)
        } else {
            None
        }
    }
}
