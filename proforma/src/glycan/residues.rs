use std::collections::HashMap;

use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, ElementProvider},
};

/// Something that knows the formulas of monosaccharide residues by their abbreviation
pub trait GlycanResidueProvider {
    /// Get the formula of the residue with this abbreviation, eg `Hex` or `HexNAc`
    fn get_glycan_residue(&self, abbreviation: &str) -> Option<ChemicalFormula>;
}

/// An in memory table of glycan residues
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct GlycanResidueTable {
    residues: HashMap<Box<str>, ChemicalFormula>,
}

impl GlycanResidueTable {
    /// Create a table from the given residues, later residues replace earlier residues with the same abbreviation
    pub fn new(residues: impl IntoIterator<Item = (impl Into<Box<str>>, ChemicalFormula)>) -> Self {
        Self {
            residues: residues
                .into_iter()
                .map(|(name, formula)| (name.into(), formula))
                .collect(),
        }
    }

    /// The residues defined for ProForma glycan compositions, plus some common aliases.
    /// ```rust
    /// use proforma::prelude::*;
    /// let residues = GlycanResidueTable::common(&PeriodicTable::common()).unwrap();
    /// assert_eq!(
    ///     residues.get_glycan_residue("HexNAc").unwrap().hill_notation(),
    ///     "C8H13NO5"
    /// );
    /// ```
    /// # Errors
    /// If the element provider does not know all elements used in the residues (C, H, N, O, P and S).
    pub fn common(
        elements: &dyn ElementProvider,
    ) -> Result<Self, BoxedError<'static, ProFormaErrorKind>> {
        COMMON_GLYCAN_RESIDUES
            .iter()
            .map(|(name, formula)| {
                ChemicalFormula::parse(formula, elements)
                    .map(|f| (*name, f))
                    .map_err(|err| {
                        BoxedError::new(
                            ProFormaErrorKind::Lookup,
                            "Invalid glycan residue table",
                            format!("The formula for '{name}' uses an element that is not known"),
                            Context::none(),
                        )
                        .add_underlying_error(err.to_owned())
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// The number of residues
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Check if there are no residues
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

impl GlycanResidueProvider for GlycanResidueTable {
    fn get_glycan_residue(&self, abbreviation: &str) -> Option<ChemicalFormula> {
        self.residues.get(abbreviation).cloned()
    }
}

const COMMON_GLYCAN_RESIDUES: &[(&str, &str)] = &[
    ("Hex", "C6H10O5"),
    ("HexNAc", "C8H13NO5"),
    ("HexS", "C6H10O8S"),
    ("HexP", "C6H11O8P"),
    ("HexNAcS", "C8H13NO8S"),
    ("HexN", "C6H11NO4"),
    ("HexNS", "C6H11NO7S"),
    ("dHex", "C6H10O4"),
    ("aHex", "C6H8O6"),
    ("HexA", "C6H8O6"),
    ("Neu", "C9H15NO7"),
    ("NeuAc", "C11H17NO8"),
    ("NeuGc", "C11H17NO9"),
    ("Sug", "C2H2O"),
    ("Tri", "C3H4O2"),
    ("Tet", "C4H6O3"),
    ("Pen", "C5H8O4"),
    ("Hep", "C7H12O6"),
    ("Oct", "C8H14O7"),
    ("Non", "C9H16O8"),
    ("Dec", "C10H18O9"),
    ("Fuc", "C6H10O4"),
    ("Sulfate", "O3S"),
    ("Sulfo", "O3S"),
    ("Phosphate", "HO3P"),
    ("Phospho", "HO3P"),
];

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::chemistry::PeriodicTable;

    #[test]
    fn common_residues() {
        let table = PeriodicTable::common();
        let residues = GlycanResidueTable::common(&table).unwrap();
        assert_eq!(residues.len(), COMMON_GLYCAN_RESIDUES.len());
        assert_eq!(
            residues.get_glycan_residue("dHex"),
            residues.get_glycan_residue("Fuc")
        );
        assert_eq!(
            residues.get_glycan_residue("NeuAc").unwrap().to_string(),
            "C11H17NO8"
        );
        assert!(residues.get_glycan_residue("hex").is_none());
    }

    #[test]
    fn missing_elements() {
        let table = PeriodicTable::new([]);
        let error = GlycanResidueTable::common(&table).unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
    }
}
