use std::fmt::{Display, Write};

use itertools::Itertools;

use crate::chemistry::ChemicalFormula;

impl ChemicalFormula {
    /// Write this formula in Hill notation: carbon first, then hydrogen, then all other elements
    /// alphabetically. Isotopes follow their natural element and are written between square
    /// brackets with their mass number (`[13C6]`). A count of one is left out.
    /// ```rust
    /// use proforma::prelude::*;
    /// let table = PeriodicTable::common();
    /// let formula = ChemicalFormula::parse("O4 H10 C6", &table).unwrap();
    /// assert_eq!(formula.hill_notation(), "C6H10O4");
    /// ```
    pub fn hill_notation(&self) -> String {
        self.to_string()
    }

    fn hill(&self, f: &mut impl Write) -> std::fmt::Result {
        let order = |symbol: &str| match symbol {
            "C" => 0,
            "H" => 1,
            _ => 2,
        };
        for (element, count) in self.elements().iter().sorted_by(|(a, _), (b, _)| {
            order(a.symbol())
                .cmp(&order(b.symbol()))
                .then_with(|| a.symbol().cmp(b.symbol()))
                .then_with(|| a.fixed_isotope().cmp(&b.fixed_isotope()))
        }) {
            if let Some(mass_number) = element.fixed_isotope() {
                write!(f, "[{mass_number}{}", element.symbol())?;
                if *count != 1 {
                    write!(f, "{count}")?;
                }
                write!(f, "]")?;
            } else {
                write!(f, "{}", element.symbol())?;
                if *count != 1 {
                    write!(f, "{count}")?;
                }
            }
        }
        Ok(())
    }
}

impl Display for ChemicalFormula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.hill(f)
    }
}
