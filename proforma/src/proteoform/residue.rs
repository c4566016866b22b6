use std::collections::HashMap;

use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, ElementProvider},
};

/// A residue as used in a proteoform, the formula is the formula of the residue inside a chain
/// (so without the water that is lost when forming the peptide bond)
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Residue {
    /// The one letter code
    pub symbol: char,
    /// The full name
    pub name: Box<str>,
    /// The residue formula
    pub formula: ChemicalFormula,
}

/// Something that knows residues by their one letter code
pub trait ResidueProvider {
    /// Get the residue for this one letter code
    fn get_residue(&self, symbol: char) -> Option<Residue>;
}

/// The standard amino acids plus selenocysteine (`U`) and pyrrolysine (`O`). The ambiguous
/// codes (`B`, `J`, `X`, `Z`) have no single formula and are not included.
/// ```rust
/// use proforma::prelude::*;
/// let residues = AminoAcidTable::new(&PeriodicTable::common()).unwrap();
/// let glycine = residues.get_residue('G').unwrap();
/// assert_eq!(glycine.formula.to_string(), "C2H3NO");
/// assert!(residues.get_residue('X').is_none());
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AminoAcidTable {
    residues: HashMap<char, Residue>,
}

impl AminoAcidTable {
    /// Build the amino acid table with the given elements
    /// # Errors
    /// If the elements needed for the amino acids are missing.
    pub fn new(
        elements: &dyn ElementProvider,
    ) -> Result<Self, BoxedError<'static, ProFormaErrorKind>> {
        AMINO_ACIDS
            .iter()
            .map(|(symbol, name, formula)| {
                ChemicalFormula::parse(formula, elements)
                    .map(|formula| {
                        (
                            *symbol,
                            Residue {
                                symbol: *symbol,
                                name: (*name).into(),
                                formula,
                            },
                        )
                    })
                    .map_err(|err| {
                        BoxedError::new(
                            ProFormaErrorKind::Create,
                            "Invalid amino acid table",
                            format!("The formula for {name} could not be built with the given elements"),
                            Context::none(),
                        )
                        .add_underlying_error(err.to_owned())
                    })
            })
            .collect::<Result<_, _>>()
            .map(|residues| Self { residues })
    }

    /// Create a table from custom residues, later residues replace earlier residues with the same symbol
    pub fn from_residues(residues: impl IntoIterator<Item = Residue>) -> Self {
        Self {
            residues: residues.into_iter().map(|r| (r.symbol, r)).collect(),
        }
    }

    /// Add or replace a residue
    #[must_use]
    pub fn with_residue(mut self, residue: Residue) -> Self {
        self.residues.insert(residue.symbol, residue);
        self
    }

    /// The number of residues
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Check if this table is empty
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

impl ResidueProvider for AminoAcidTable {
    fn get_residue(&self, symbol: char) -> Option<Residue> {
        self.residues.get(&symbol).cloned()
    }
}

const AMINO_ACIDS: &[(char, &str, &str)] = &[
    ('A', "Alanine", "C3H5NO"),
    ('R', "Arginine", "C6H12N4O"),
    ('N', "Asparagine", "C4H6N2O2"),
    ('D', "AsparticAcid", "C4H5NO3"),
    ('C', "Cysteine", "C3H5NOS"),
    ('Q', "Glutamine", "C5H8N2O2"),
    ('E', "GlutamicAcid", "C5H7NO3"),
    ('G', "Glycine", "C2H3NO"),
    ('H', "Histidine", "C6H7N3O"),
    ('I', "Isoleucine", "C6H11NO"),
    ('L', "Leucine", "C6H11NO"),
    ('K', "Lysine", "C6H12N2O"),
    ('M', "Methionine", "C5H9NOS"),
    ('F', "Phenylalanine", "C9H9NO"),
    ('P', "Proline", "C5H7NO"),
    ('S', "Serine", "C3H5NO2"),
    ('T', "Threonine", "C4H7NO2"),
    ('W', "Tryptophan", "C11H10N2O"),
    ('Y', "Tyrosine", "C9H9NO2"),
    ('V', "Valine", "C5H9NO"),
    ('U', "Selenocysteine", "C3H5NOSe"),
    ('O', "Pyrrolysine", "C12H19N3O2"),
];

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::{chemistry::PeriodicTable, system::dalton};

    #[test]
    fn standard_residues() {
        let table = AminoAcidTable::new(&PeriodicTable::common()).unwrap();
        assert_eq!(table.len(), 22);
        let tryptophan = table.get_residue('W').unwrap();
        assert!((tryptophan.formula.monoisotopic_mass().get::<dalton>() - 186.079313).abs() < 1e-5);
        assert_eq!(
            table.get_residue('I').unwrap().formula,
            table.get_residue('L').unwrap().formula
        );
        for ambiguous in ['B', 'J', 'X', 'Z'] {
            assert!(table.get_residue(ambiguous).is_none());
        }
    }

    #[test]
    fn custom_residues() {
        let elements = PeriodicTable::common();
        let table = AminoAcidTable::new(&elements).unwrap().with_residue(Residue {
            symbol: 'X',
            name: "Unknown".into(),
            formula: ChemicalFormula::default(),
        });
        assert_eq!(table.get_residue('X').unwrap().name.as_ref(), "Unknown");
        assert!(AminoAcidTable::new(&PeriodicTable::new([])).is_err());
    }
}
