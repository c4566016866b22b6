use std::{
    ops::{Add, AddAssign, Mul, Neg, Sub},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    chemistry::{Element, MassMode},
    system::{Mass, zero},
};

/// A chemical formula, a multiset of elements with an integer count. Counts can be negative, which
/// is used for modifications that remove atoms. The elements are stored sorted and without zero
/// counts, so two formulas with the same composition always compare equal. The arithmetic
/// operators saturate at the bounds of `i32`, use the `checked_*` methods to detect overflow.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ChemicalFormula {
    elements: ThinVec<(Arc<Element>, i32)>,
}

impl ChemicalFormula {
    /// Create a new formula from the given element counts, duplicate elements are merged and zero counts removed.
    pub fn new(elements: impl IntoIterator<Item = (Arc<Element>, i32)>) -> Self {
        let mut result = Self::default();
        for (element, count) in elements {
            result.add_element(element, count);
        }
        result
    }

    /// Add the given number of atoms of an element to this formula, the count saturates on overflow
    pub fn add_element(&mut self, element: Arc<Element>, count: i32) {
        self.merge_element(element, count, |a, b| Some(a.saturating_add(b)));
    }

    /// Add the given number of atoms of an element to this formula. Returns None and leaves the
    /// formula unchanged if the resulting count does not fit in an `i32`.
    #[must_use]
    pub fn checked_add_element(&mut self, element: Arc<Element>, count: i32) -> Option<()> {
        self.merge_element(element, count, i32::checked_add)
    }

    fn merge_element(
        &mut self,
        element: Arc<Element>,
        count: i32,
        combine: impl Fn(i32, i32) -> Option<i32>,
    ) -> Option<()> {
        if count == 0 {
            return Some(());
        }
        match self.elements.binary_search_by(|(e, _)| e.cmp(&element)) {
            Ok(index) => {
                let total = combine(self.elements[index].1, count)?;
                if total == 0 {
                    self.elements.remove(index);
                } else {
                    self.elements[index].1 = total;
                }
            }
            Err(index) => self.elements.insert(index, (element, count)),
        }
        Some(())
    }

    /// All element counts, none of these counts is zero
    pub fn elements(&self) -> &[(Arc<Element>, i32)] {
        &self.elements
    }

    /// The count for the natural element with the given symbol
    pub fn count(&self, symbol: &str) -> i32 {
        self.elements
            .iter()
            .filter(|(e, _)| e.fixed_isotope().is_none() && e.symbol() == symbol)
            .map(|(_, n)| *n)
            .sum()
    }

    /// Check if this formula has no atoms
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Add two formulas, equivalent to `self + other`
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        self + other
    }

    /// Scale every count by the given factor, equivalent to `self * factor`
    #[must_use]
    pub fn multiply(&self, factor: i32) -> Self {
        self * factor
    }

    /// Add two formulas, None if any count overflows
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        let mut result = self.clone();
        for (e, n) in &other.elements {
            result.checked_add_element(e.clone(), *n)?;
        }
        Some(result)
    }

    /// Scale every count by the given factor, None if any count overflows
    pub fn checked_mul(&self, factor: i32) -> Option<Self> {
        if factor == 0 {
            return Some(Self::default());
        }
        self.elements
            .iter()
            .map(|(e, n)| n.checked_mul(factor).map(|n| (e.clone(), n)))
            .collect::<Option<ThinVec<_>>>()
            .map(|elements| Self { elements })
    }

    /// The mass of this formula
    pub fn mass(&self, mode: MassMode) -> Mass {
        self.elements
            .iter()
            .fold(zero(), |acc, (e, n)| acc + e.mass(mode) * f64::from(*n))
    }

    /// The monoisotopic mass of this formula
    pub fn monoisotopic_mass(&self) -> Mass {
        self.mass(MassMode::Monoisotopic)
    }

    /// The average mass of this formula
    pub fn average_mass(&self) -> Mass {
        self.mass(MassMode::Average)
    }

    /// Replace all natural occurrences of the element of the given isotope by that isotope. So
    /// with a label of `13C` all carbons in the formula become `13C`.
    #[must_use]
    pub fn with_isotope_label(&self, label: &Arc<Element>) -> Self {
        Self::new(self.elements.iter().map(|(e, n)| {
            if e.fixed_isotope().is_none() && e.symbol() == label.symbol() {
                (label.clone(), *n)
            } else {
                (e.clone(), *n)
            }
        }))
    }
}

impl Add<&ChemicalFormula> for &ChemicalFormula {
    type Output = ChemicalFormula;
    fn add(self, rhs: &ChemicalFormula) -> Self::Output {
        let mut result = self.clone();
        for (e, n) in &rhs.elements {
            result.add_element(e.clone(), *n);
        }
        result
    }
}

impl Sub<&ChemicalFormula> for &ChemicalFormula {
    type Output = ChemicalFormula;
    fn sub(self, rhs: &ChemicalFormula) -> Self::Output {
        let mut result = self.clone();
        for (e, n) in &rhs.elements {
            result.add_element(e.clone(), n.saturating_neg());
        }
        result
    }
}

impl Mul<&i32> for &ChemicalFormula {
    type Output = ChemicalFormula;
    fn mul(self, rhs: &i32) -> Self::Output {
        ChemicalFormula::new(
            self.elements
                .iter()
                .map(|(e, n)| (e.clone(), n.saturating_mul(*rhs))),
        )
    }
}

impl Neg for &ChemicalFormula {
    type Output = ChemicalFormula;
    fn neg(self) -> Self::Output {
        self * -1
    }
}

impl Neg for ChemicalFormula {
    type Output = Self;
    fn neg(self) -> Self::Output {
        -&self
    }
}

impl AddAssign<&Self> for ChemicalFormula {
    fn add_assign(&mut self, rhs: &Self) {
        for (e, n) in &rhs.elements {
            self.add_element(e.clone(), *n);
        }
    }
}

impl AddAssign for ChemicalFormula {
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl std::iter::Sum for ChemicalFormula {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, f| acc + f)
    }
}

impl_binop_ref_cases!(impl Add, add for ChemicalFormula, ChemicalFormula, ChemicalFormula);
impl_binop_ref_cases!(impl Sub, sub for ChemicalFormula, ChemicalFormula, ChemicalFormula);
impl_binop_ref_cases!(impl Mul, mul for ChemicalFormula, i32, ChemicalFormula);
