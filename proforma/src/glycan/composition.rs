use context_error::*;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    ProFormaErrorKind, chemistry::ChemicalFormula, glycan::GlycanResidueProvider,
    helper_functions::explain_number_error,
};

/// A glycan composition, eg `HexNAc2Hex3`, with the counts for every residue
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct GlycanComposition {
    residues: ThinVec<(Box<str>, i32)>,
    formula: ChemicalFormula,
}

impl GlycanComposition {
    /// Parse a glycan composition. Every residue is the longest prefix of the remaining
    /// alphabetic text that the provider knows, optionally followed by a (signed) count. A
    /// missing count is 1. Residues that occur multiple times are merged.
    /// ```rust
    /// use proforma::{glycan::GlycanComposition, prelude::*};
    /// let residues = GlycanResidueTable::common(&PeriodicTable::common()).unwrap();
    /// let composition = GlycanComposition::parse("HexNAc2Hex3HexNAc", &residues).unwrap();
    /// assert_eq!(composition.residues()[0], (Box::<str>::from("HexNAc"), 3));
    /// assert_eq!(composition.formula().hill_notation(), "C42H69N3O30");
    /// ```
    /// # Errors
    /// If a residue is not known by the provider, if a count is not a valid number, or if the
    /// composition is empty.
    pub fn parse<'a>(
        value: &'a str,
        residues: &dyn GlycanResidueProvider,
    ) -> Result<Self, BoxedError<'a, ProFormaErrorKind>> {
        let base_context = Context::none().lines(0, value);
        let bytes = value.as_bytes();
        let mut composition: ThinVec<(Box<str>, i32)> = ThinVec::new();
        let mut formula = ChemicalFormula::default();
        let mut index = 0;

        while index < bytes.len() {
            if bytes[index].is_ascii_whitespace() {
                index += 1;
                continue;
            }
            let run = bytes[index..]
                .iter()
                .take_while(|c| c.is_ascii_alphabetic())
                .count();
            let (len, residue) = (1..=run)
                .rev()
                .find_map(|len| {
                    residues
                        .get_glycan_residue(&value[index..index + len])
                        .map(|f| (len, f))
                })
                .ok_or_else(|| {
                    BoxedError::new(
                        ProFormaErrorKind::Lookup,
                        "Invalid glycan composition",
                        "No known glycan residue starts here",
                        base_context.clone().add_highlight((0, index, run.max(1))),
                    )
                })?;
            let start = index;
            let name = &value[index..index + len];
            index += len;

            let sign = usize::from(bytes.get(index) == Some(&b'-'));
            let digits = bytes[(index + sign).min(bytes.len())..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .count();
            let count = if digits == 0 {
                1
            } else {
                let number = &value[index..index + sign + digits];
                index += sign + digits;
                number.parse::<i32>().map_err(|err| {
                    BoxedError::new(
                        ProFormaErrorKind::Lookup,
                        "Invalid glycan composition",
                        format!("The residue count {}", explain_number_error(&err)),
                        base_context
                            .clone()
                            .add_highlight((0, index - sign - digits, sign + digits)),
                    )
                })?
            };

            let overflow = || {
                BoxedError::new(
                    ProFormaErrorKind::Lookup,
                    "Invalid glycan composition",
                    "The total count for this residue is too big to fit in a 32 bit integer",
                    base_context.clone().add_highlight((0, start, index - start)),
                )
            };
            formula = residue
                .checked_mul(count)
                .and_then(|added| formula.checked_add(&added))
                .ok_or_else(overflow)?;
            if let Some(existing) = composition.iter_mut().find(|(n, _)| **n == *name) {
                existing.1 = existing.1.checked_add(count).ok_or_else(overflow)?;
            } else {
                composition.push((name.into(), count));
            }
        }

        if composition.is_empty() {
            return Err(BoxedError::new(
                ProFormaErrorKind::Lookup,
                "Invalid glycan composition",
                "A glycan composition cannot be empty",
                base_context,
            ));
        }
        Ok(Self {
            residues: composition,
            formula,
        })
    }

    /// The residues with their counts, in order of first occurrence
    pub fn residues(&self) -> &[(Box<str>, i32)] {
        &self.residues
    }

    /// The total formula of this composition
    pub const fn formula(&self) -> &ChemicalFormula {
        &self.formula
    }
}
