use std::{fmt::Display, sync::Arc};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    chemistry::{ChemicalFormula, Element, MassMode},
    ontology::Ontology,
    system::{Mass, da, dalton},
};

/// The relative difference below which two masses are the same value
const MASS_EPSILON: f64 = 1e-12;

/// The change in mass that a modification causes
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MassDelta {
    /// Only a mass is known, in dalton, this is the same for all mass modes
    Mass(OrderedFloat<f64>),
    /// The full chemical formula is known
    Formula(ChemicalFormula),
}

/// Where a resolved modification came from
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum ModificationOrigin {
    /// A mass shift, eg `+15.995`
    Mass,
    /// A chemical formula, eg `Formula:O`
    Formula,
    /// A glycan composition with the count for every residue
    Glycan(ThinVec<(Box<str>, i32)>),
    /// An ontology entry
    Ontology {
        /// The ontology
        ontology: Ontology,
        /// The numeric id in the ontology
        id: u32,
        /// The name of the entry
        name: Box<str>,
    },
    /// A BRNO histone modification abbreviation, eg `ac`
    Brno(Box<str>),
}

/// A modification resolved into its mass change
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Modification {
    origin: ModificationOrigin,
    delta: MassDelta,
}

impl Modification {
    /// Create a new modification
    pub const fn new(origin: ModificationOrigin, delta: MassDelta) -> Self {
        Self { origin, delta }
    }

    /// Create a mass only modification
    pub const fn mass_shift(mass: f64) -> Self {
        Self::new(ModificationOrigin::Mass, MassDelta::Mass(OrderedFloat(mass)))
    }

    /// Create a modification from a chemical formula
    pub const fn from_formula(formula: ChemicalFormula) -> Self {
        Self::new(ModificationOrigin::Formula, MassDelta::Formula(formula))
    }

    /// Where this modification came from
    pub const fn origin(&self) -> &ModificationOrigin {
        &self.origin
    }

    /// The mass change
    pub const fn delta(&self) -> &MassDelta {
        &self.delta
    }

    /// The formula, if known
    pub const fn formula(&self) -> Option<&ChemicalFormula> {
        match &self.delta {
            MassDelta::Formula(formula) => Some(formula),
            MassDelta::Mass(_) => None,
        }
    }

    /// The mass change for the given mode, a mass only modification gives the same mass for all modes
    pub fn mass(&self, mode: MassMode) -> Mass {
        match &self.delta {
            MassDelta::Mass(mass) => da(mass.0),
            MassDelta::Formula(formula) => formula.mass(mode),
        }
    }

    /// Check if two modifications cause the same change. Two formulas have to be identical, if
    /// either side only has a mass the monoisotopic masses have to be identical up to floating
    /// point rounding.
    /// ```rust
    /// use proforma::{ontology::Modification, prelude::*};
    /// let table = PeriodicTable::common();
    /// let oxygen = Modification::from_formula(ChemicalFormula::parse("O", &table).unwrap());
    /// let nh2 = Modification::from_formula(ChemicalFormula::parse("NH2", &table).unwrap());
    /// assert!(oxygen.is_equivalent(&oxygen.clone()));
    /// assert!(!oxygen.is_equivalent(&nh2));
    /// assert!(!oxygen.is_equivalent(&Modification::mass_shift(15.995)));
    /// ```
    pub fn is_equivalent(&self, other: &Self) -> bool {
        match (&self.delta, &other.delta) {
            (MassDelta::Formula(a), MassDelta::Formula(b)) => a == b,
            _ => {
                let a = self.mass(MassMode::Monoisotopic).get::<dalton>();
                let b = other.mass(MassMode::Monoisotopic).get::<dalton>();
                (a - b).abs() <= MASS_EPSILON * a.abs().max(b.abs()).max(1.0)
            }
        }
    }

    /// Apply an isotope label to the formula of this modification
    #[must_use]
    pub fn with_isotope_label(&self, label: &Arc<Element>) -> Self {
        match &self.delta {
            MassDelta::Formula(formula) => Self {
                origin: self.origin.clone(),
                delta: MassDelta::Formula(formula.with_isotope_label(label)),
            },
            MassDelta::Mass(_) => self.clone(),
        }
    }
}

impl Display for Modification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.origin {
            ModificationOrigin::Ontology { ontology, id, name } => {
                write!(f, "{} ({name})", ontology.accession(*id))
            }
            ModificationOrigin::Brno(name) => write!(f, "B:{name}"),
            ModificationOrigin::Glycan(residues) => {
                write!(f, "Glycan:")?;
                for (name, count) in residues {
                    write!(f, "{name}{count}")?;
                }
                Ok(())
            }
            ModificationOrigin::Mass | ModificationOrigin::Formula => match &self.delta {
                MassDelta::Mass(mass) => write!(f, "{:+}", mass.0),
                MassDelta::Formula(formula) => write!(f, "Formula:{formula}"),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::chemistry::PeriodicTable;

    #[test]
    fn mass_modes() {
        let table = PeriodicTable::common();
        let shift = Modification::mass_shift(-18.010565);
        assert_eq!(
            shift.mass(MassMode::Monoisotopic),
            shift.mass(MassMode::Average)
        );
        assert!(shift.formula().is_none());

        let water = Modification::from_formula(ChemicalFormula::parse("H-2O-1", &table).unwrap());
        assert!((water.mass(MassMode::Monoisotopic).get::<dalton>() + 18.010565).abs() < 1e-5);
        assert!(water.mass(MassMode::Average) < water.mass(MassMode::Monoisotopic));
    }

    #[test]
    fn equivalence() {
        let table = PeriodicTable::common();
        let formula = ChemicalFormula::parse("HPO3", &table).unwrap();
        let mass = formula.monoisotopic_mass().get::<dalton>();
        let phospho = Modification::from_formula(formula.clone());
        let named = Modification::new(
            ModificationOrigin::Ontology {
                ontology: Ontology::Unimod,
                id: 21,
                name: "Phospho".into(),
            },
            MassDelta::Formula(formula),
        );
        assert!(phospho.is_equivalent(&named));
        assert!(phospho.is_equivalent(&Modification::mass_shift(mass)));
        assert!(!phospho.is_equivalent(&Modification::mass_shift(79.966)));
    }

    #[test]
    fn display() {
        let table = PeriodicTable::common();
        assert_eq!(Modification::mass_shift(15.995).to_string(), "+15.995");
        assert_eq!(
            Modification::from_formula(ChemicalFormula::parse("C2H2O", &table).unwrap())
                .to_string(),
            "Formula:C2H2O"
        );
        let named = Modification::new(
            ModificationOrigin::Ontology {
                ontology: Ontology::Resid,
                id: 37,
                name: "O-phospho-L-serine".into(),
            },
            MassDelta::Mass(OrderedFloat(79.966)),
        );
        assert_eq!(named.to_string(), "RESID:AA0037 (O-phospho-L-serine)");
    }
}
