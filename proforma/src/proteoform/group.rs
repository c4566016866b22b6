use serde::{Deserialize, Serialize};

use crate::{
    chemistry::{ChemicalFormula, MassMode},
    ontology::Modification,
    proteoform::Residue,
    sequence::ProFormaMembershipDescriptor,
    system::{Mass, zero},
};

/// A modification placed on a range of residues, eg `PRT(ESFRMS)[+19.0523]ISK`
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct RangedModification {
    /// The modification
    pub modification: Modification,
    /// The zero based start index
    pub start: usize,
    /// The zero based end index (inclusive)
    pub end: usize,
}

/// A modification placed on one of a set of candidate locations, eg `EM[Oxidation#g1]EVEM[#g1]K`
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct GroupedModification {
    /// The group name
    pub name: String,
    /// The modification
    pub modification: Modification,
    /// All candidate locations
    pub candidates: Vec<ProFormaMembershipDescriptor>,
    /// The index into the candidates where the modification was written
    pub preferred_location: usize,
}

/// A fully resolved proteoform. Every residue and modification is known with its mass, so the
/// mass of the whole molecule can be calculated. Created by [`crate::proteoform::ProteoformGroupFactory`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProteoformGroup {
    pub(super) residues: Vec<Residue>,
    pub(super) n_term: Option<Modification>,
    pub(super) c_term: Option<Modification>,
    pub(super) localized: Vec<(Modification, usize)>,
    pub(super) ranged: Vec<RangedModification>,
    pub(super) grouped: Vec<GroupedModification>,
    pub(super) unlocalized: Vec<(Modification, u32)>,
    pub(super) labile: Vec<Modification>,
    pub(super) water: ChemicalFormula,
}

impl ProteoformGroup {
    /// The residues, in sequence order
    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    /// The N terminal modification
    pub const fn n_term(&self) -> Option<&Modification> {
        self.n_term.as_ref()
    }

    /// The C terminal modification
    pub const fn c_term(&self) -> Option<&Modification> {
        self.c_term.as_ref()
    }

    /// The modifications placed on a single residue, with the zero based index of that residue
    pub fn localized(&self) -> &[(Modification, usize)] {
        &self.localized
    }

    /// The modifications placed on a range
    pub fn ranged(&self) -> &[RangedModification] {
        &self.ranged
    }

    /// The modifications with multiple candidate locations
    pub fn grouped(&self) -> &[GroupedModification] {
        &self.grouped
    }

    /// The modifications without a location, with the number of times they occur
    pub fn unlocalized(&self) -> &[(Modification, u32)] {
        &self.unlocalized
    }

    /// The labile modifications, these are not part of the intact mass
    pub fn labile(&self) -> &[Modification] {
        &self.labile
    }

    /// The formula of the water that completes the chain
    pub const fn water(&self) -> &ChemicalFormula {
        &self.water
    }

    /// All modifications that contribute to the intact mass, with the number of times they occur
    fn placed_modifications(&self) -> impl Iterator<Item = (&Modification, u32)> {
        self.n_term
            .iter()
            .chain(self.c_term.iter())
            .chain(self.localized.iter().map(|(m, _)| m))
            .chain(self.ranged.iter().map(|r| &r.modification))
            .chain(self.grouped.iter().map(|g| &g.modification))
            .map(|m| (m, 1))
            .chain(self.unlocalized.iter().map(|(m, count)| (m, *count)))
    }

    /// The mass of the intact proteoform: water, all residues and all modifications except the
    /// labile ones.
    pub fn mass(&self, mode: MassMode) -> Mass {
        let residues = self
            .residues
            .iter()
            .fold(zero(), |acc, r| acc + r.formula.mass(mode));
        self.placed_modifications()
            .fold(self.water.mass(mode) + residues, |acc, (m, count)| {
                acc + m.mass(mode) * f64::from(count)
            })
    }

    /// The monoisotopic mass, see [`Self::mass`]
    pub fn monoisotopic_mass(&self) -> Mass {
        self.mass(MassMode::Monoisotopic)
    }

    /// The average mass, see [`Self::mass`]
    pub fn average_mass(&self) -> Mass {
        self.mass(MassMode::Average)
    }

    /// The formula of the intact proteoform. None if any of the modifications is only known by its
    /// mass, or if an element count does not fit in an `i32`.
    pub fn formula(&self) -> Option<ChemicalFormula> {
        let mut formula = self.water.clone();
        for residue in &self.residues {
            formula = formula.checked_add(&residue.formula)?;
        }
        for (modification, count) in self.placed_modifications() {
            let added = modification
                .formula()?
                .checked_mul(i32::try_from(count).ok()?)?;
            formula = formula.checked_add(&added)?;
        }
        Some(formula)
    }
}
