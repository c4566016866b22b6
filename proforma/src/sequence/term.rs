use context_error::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    ProFormaErrorKind,
    sequence::{
        ProFormaDescriptor, ProFormaGlobalModification, ProFormaTag, ProFormaTagGroup,
        ProFormaUnlocalizedTag,
    },
};

/// A parsed ProForma term: a sequence with all its annotations. A term is immutable once built,
/// and every term upholds these rules:
/// * All indices lie within the sequence.
/// * Two ranges (of tags or group memberships) are either identical or disjoint.
/// * Tags are sorted on start index, ranges before single residue tags at the same index.
///
/// Deserializing a term checks these same rules.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct ProFormaTerm {
    sequence: String,
    n_term: ThinVec<ProFormaDescriptor>,
    c_term: ThinVec<ProFormaDescriptor>,
    tags: Vec<ProFormaTag>,
    tag_groups: Vec<ProFormaTagGroup>,
    unlocalized: Vec<ProFormaUnlocalizedTag>,
    labile: ThinVec<ProFormaDescriptor>,
    global_modifications: Vec<ProFormaGlobalModification>,
}

impl ProFormaTerm {
    /// Create a new term from a sequence of one letter residue codes and the tags on it.
    /// # Errors
    /// If the sequence is empty or not all uppercase ASCII letters, if a tag lies (partly)
    /// outside the sequence, or if two ranges overlap without being identical.
    pub fn new(
        sequence: impl Into<String>,
        tags: impl IntoIterator<Item = ProFormaTag>,
    ) -> Result<Self, BoxedError<'static, ProFormaErrorKind>> {
        let mut term = Self {
            sequence: sequence.into(),
            tags: tags.into_iter().collect(),
            ..Self::default()
        };
        term.sort_tags();
        term.validate()?;
        Ok(term)
    }

    /// Set the tag groups
    /// # Errors
    /// If a membership lies (partly) outside the sequence, if a membership range overlaps
    /// another range without being identical, or if the preferred location does not exist.
    pub fn with_tag_groups(
        self,
        tag_groups: impl IntoIterator<Item = ProFormaTagGroup>,
    ) -> Result<Self, BoxedError<'static, ProFormaErrorKind>> {
        let term = Self {
            tag_groups: tag_groups.into_iter().collect(),
            ..self
        };
        term.validate()?;
        Ok(term)
    }

    /// Set the N terminal descriptors
    #[must_use]
    pub fn with_n_term(self, descriptors: impl IntoIterator<Item = ProFormaDescriptor>) -> Self {
        Self {
            n_term: descriptors.into_iter().collect(),
            ..self
        }
    }

    /// Set the C terminal descriptors
    #[must_use]
    pub fn with_c_term(self, descriptors: impl IntoIterator<Item = ProFormaDescriptor>) -> Self {
        Self {
            c_term: descriptors.into_iter().collect(),
            ..self
        }
    }

    /// Set the unlocalized tags
    #[must_use]
    pub fn with_unlocalized(self, tags: impl IntoIterator<Item = ProFormaUnlocalizedTag>) -> Self {
        Self {
            unlocalized: tags.into_iter().filter(|t| t.count > 0).collect(),
            ..self
        }
    }

    /// Set the labile descriptors
    #[must_use]
    pub fn with_labile(self, descriptors: impl IntoIterator<Item = ProFormaDescriptor>) -> Self {
        Self {
            labile: descriptors.into_iter().collect(),
            ..self
        }
    }

    /// Set the global modifications
    #[must_use]
    pub fn with_global_modifications(
        self,
        modifications: impl IntoIterator<Item = ProFormaGlobalModification>,
    ) -> Self {
        Self {
            global_modifications: modifications.into_iter().collect(),
            ..self
        }
    }

    /// The sequence as one letter residue codes
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// The number of residues
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Check if the sequence is empty, which is never the case for a constructed term
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The N terminal descriptors, empty if there are none
    pub fn n_term(&self) -> &[ProFormaDescriptor] {
        &self.n_term
    }

    /// The C terminal descriptors, empty if there are none
    pub fn c_term(&self) -> &[ProFormaDescriptor] {
        &self.c_term
    }

    /// All tags, sorted on start index
    pub fn tags(&self) -> &[ProFormaTag] {
        &self.tags
    }

    /// All tag groups, in order of first occurrence
    pub fn tag_groups(&self) -> &[ProFormaTagGroup] {
        &self.tag_groups
    }

    /// All unlocalized tags
    pub fn unlocalized(&self) -> &[ProFormaUnlocalizedTag] {
        &self.unlocalized
    }

    /// The labile descriptors, empty if there are none
    pub fn labile(&self) -> &[ProFormaDescriptor] {
        &self.labile
    }

    /// All global modifications
    pub fn global_modifications(&self) -> &[ProFormaGlobalModification] {
        &self.global_modifications
    }

    /// All spans covering more than one residue, from tags and group memberships
    fn range_spans(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tags
            .iter()
            .filter(|t| t.is_range())
            .map(|t| (t.start(), t.end()))
            .chain(
                self.tag_groups
                    .iter()
                    .flat_map(ProFormaTagGroup::memberships)
                    .filter(|m| m.is_range())
                    .map(|m| (m.start, m.end)),
            )
    }

    fn sort_tags(&mut self) {
        self.tags
            .sort_by(|a, b| a.start().cmp(&b.start()).then(b.end().cmp(&a.end())));
    }

    fn validate(&self) -> Result<(), BoxedError<'static, ProFormaErrorKind>> {
        if self.sequence.is_empty() {
            return Err(invalid_term("The sequence of a term cannot be empty"));
        }
        if let Some(c) = self.sequence.chars().find(|c| !c.is_ascii_uppercase()) {
            return Err(invalid_term(format!(
                "The sequence can only contain uppercase one letter residue codes, '{c}' is not allowed"
            )));
        }
        let len = self.sequence.len();
        for tag in &self.tags {
            if tag.start() > tag.end() || tag.end() >= len {
                return Err(invalid_term(format!(
                    "The tag on {}..={} does not lie within the sequence of length {len}",
                    tag.start(),
                    tag.end()
                )));
            }
        }
        for group in &self.tag_groups {
            if group.preferred_location() >= group.memberships().len() {
                return Err(invalid_term(format!(
                    "The preferred location of group '{}' does not exist",
                    group.name()
                )));
            }
            for membership in group.memberships() {
                if membership.start > membership.end || membership.end >= len {
                    return Err(invalid_term(format!(
                        "The membership of group '{}' on {}..={} does not lie within the sequence of length {len}",
                        group.name(),
                        membership.start,
                        membership.end
                    )));
                }
            }
        }
        if let Some(((a_start, a_end), (b_start, b_end))) = self
            .range_spans()
            .sorted_unstable()
            .dedup()
            .tuple_windows()
            .find(|(a, b)| b.0 <= a.1)
        {
            return Err(invalid_term(format!(
                "The ranges {a_start}..={a_end} and {b_start}..={b_end} overlap, ranges can only be identical or separate"
            )));
        }
        Ok(())
    }
}

/// The serialized form of a term, only turned into a term after validation
#[derive(Deserialize)]
struct SerializedTerm {
    sequence: String,
    n_term: ThinVec<ProFormaDescriptor>,
    c_term: ThinVec<ProFormaDescriptor>,
    tags: Vec<ProFormaTag>,
    tag_groups: Vec<ProFormaTagGroup>,
    unlocalized: Vec<ProFormaUnlocalizedTag>,
    labile: ThinVec<ProFormaDescriptor>,
    global_modifications: Vec<ProFormaGlobalModification>,
}

impl<'de> Deserialize<'de> for ProFormaTerm {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let SerializedTerm {
            sequence,
            n_term,
            c_term,
            tags,
            tag_groups,
            unlocalized,
            labile,
            global_modifications,
        } = SerializedTerm::deserialize(deserializer)?;
        let mut term = Self {
            sequence,
            n_term,
            c_term,
            tags,
            tag_groups,
            unlocalized: unlocalized.into_iter().filter(|t| t.count > 0).collect(),
            labile,
            global_modifications,
        };
        term.sort_tags();
        term.validate()
            .map_err(|err| <D::Error as serde::de::Error>::custom(err.to_string()))?;
        Ok(term)
    }
}

fn invalid_term(long: impl Into<String>) -> BoxedError<'static, ProFormaErrorKind> {
    BoxedError::new(
        ProFormaErrorKind::Parse,
        "Invalid ProForma term",
        long.into(),
        Context::none(),
    )
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::sequence::ProFormaMembershipDescriptor;

    #[test]
    fn sorted_tags() {
        let term = ProFormaTerm::new(
            "PEPTIDE",
            [
                ProFormaTag::single(3, [ProFormaDescriptor::from_value("Phospho")]),
                ProFormaTag::single(1, [ProFormaDescriptor::from_value("+1")]),
                ProFormaTag::new(1, 4, [ProFormaDescriptor::from_value("+2")]),
            ],
        )
        .unwrap();
        let order: Vec<_> = term.tags().iter().map(|t| (t.start(), t.end())).collect();
        assert_eq!(order, [(1, 4), (1, 1), (3, 3)]);
    }

    #[test]
    fn invalid() {
        assert!(ProFormaTerm::new("", []).is_err());
        assert!(ProFormaTerm::new("PEPtIDE", []).is_err());
        assert!(ProFormaTerm::new("PEP", [ProFormaTag::single(3, [])]).is_err());
        assert!(
            ProFormaTerm::new(
                "PEPTIDE",
                [ProFormaTag::new(0, 3, []), ProFormaTag::new(2, 5, [])]
            )
            .is_err()
        );
        assert!(
            ProFormaTerm::new(
                "PEPTIDE",
                [ProFormaTag::new(0, 5, []), ProFormaTag::new(1, 2, [])]
            )
            .is_err()
        );
        let group = ProFormaTagGroup::new(
            "g1",
            ProFormaDescriptor::from_value("Phospho"),
            vec![ProFormaMembershipDescriptor::single(1)],
            1,
        );
        assert!(
            ProFormaTerm::new("PEPTIDE", [])
                .unwrap()
                .with_tag_groups([group])
                .is_err()
        );
    }

    #[test]
    fn identical_ranges() {
        let term = ProFormaTerm::new(
            "PEPTIDE",
            [
                ProFormaTag::new(1, 3, [ProFormaDescriptor::from_value("+1")]),
                ProFormaTag::new(1, 3, [ProFormaDescriptor::from_value("+2")]),
                ProFormaTag::new(4, 6, [ProFormaDescriptor::from_value("+3")]),
            ],
        )
        .unwrap();
        assert_eq!(term.tags().len(), 3);
    }
}
