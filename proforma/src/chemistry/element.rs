//! Elements, their isotopes and the providers that hand them out by symbol.

use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Arc, LazyLock},
};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    chemistry::MassMode,
    system::{Mass, da, zero},
};

/// A single isotope of an element
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Isotope {
    /// The number of nucleons
    pub mass_number: u16,
    /// The mass in dalton
    pub mass: OrderedFloat<f64>,
    /// The natural relative abundance, as fraction
    pub abundance: OrderedFloat<f64>,
}

impl Isotope {
    /// Create a new isotope
    pub const fn new(mass_number: u16, mass: f64, abundance: f64) -> Self {
        Self {
            mass_number,
            mass: OrderedFloat(mass),
            abundance: OrderedFloat(abundance),
        }
    }
}

/// A chemical element with its natural isotopes. An element restricted to a single isotope (as
/// used for isotope labelling) is a different element from the natural one, so `13C` never equals `C`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Element {
    atomic_number: u8,
    fixed_isotope: Option<u16>,
    symbol: Box<str>,
    isotopes: ThinVec<Isotope>,
}

impl Element {
    /// Create a new natural element, the isotopes are sorted on mass number.
    pub fn new(
        atomic_number: u8,
        symbol: impl Into<Box<str>>,
        isotopes: impl IntoIterator<Item = Isotope>,
    ) -> Self {
        let mut isotopes: ThinVec<Isotope> = isotopes.into_iter().collect();
        isotopes.sort_unstable_by_key(|i| i.mass_number);
        Self {
            atomic_number,
            fixed_isotope: None,
            symbol: symbol.into(),
            isotopes,
        }
    }

    /// Derive the element that only consists of the isotope with the given mass number.
    /// Returns None if this element has no such isotope.
    pub fn with_fixed_isotope(&self, mass_number: u16) -> Option<Self> {
        let isotope = self
            .isotopes
            .iter()
            .find(|i| i.mass_number == mass_number)?;
        Some(Self {
            atomic_number: self.atomic_number,
            fixed_isotope: Some(mass_number),
            symbol: self.symbol.clone(),
            isotopes: thin_vec::thin_vec![Isotope::new(mass_number, isotope.mass.0, 1.0)],
        })
    }

    /// The atomic number
    pub const fn atomic_number(&self) -> u8 {
        self.atomic_number
    }

    /// The symbol, for example `Se`
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All known isotopes, sorted on mass number
    pub fn isotopes(&self) -> &[Isotope] {
        &self.isotopes
    }

    /// If this element is restricted to a single isotope, the mass number of that isotope
    pub const fn fixed_isotope(&self) -> Option<u16> {
        self.fixed_isotope
    }

    /// The mass of a single atom of this element for the given mode. The monoisotopic mass is the
    /// mass of the most abundant isotope, the average mass is the abundance weighted mass. An
    /// element without isotopes weighs nothing.
    pub fn mass(&self, mode: MassMode) -> Mass {
        match mode {
            MassMode::Monoisotopic => self
                .isotopes
                .iter()
                .max_by_key(|i| i.abundance)
                .map_or_else(zero, |i| da(i.mass.0)),
            MassMode::Average => {
                let total: f64 = self.isotopes.iter().map(|i| i.abundance.0).sum();
                if total == 0.0 {
                    zero()
                } else {
                    da(self
                        .isotopes
                        .iter()
                        .map(|i| i.mass.0 * i.abundance.0)
                        .sum::<f64>()
                        / total)
                }
            }
        }
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(mass_number) = self.fixed_isotope {
            write!(f, "{mass_number}{}", self.symbol)
        } else {
            write!(f, "{}", self.symbol)
        }
    }
}

/// Something that knows elements by their symbol
pub trait ElementProvider {
    /// Get the natural element with this symbol
    fn get_element(&self, symbol: &str) -> Option<Arc<Element>>;

    /// Get the element with this symbol restricted to a single isotope
    fn get_element_isotope(&self, symbol: &str, mass_number: u16) -> Option<Arc<Element>> {
        self.get_element(symbol)
            .and_then(|e| e.with_fixed_isotope(mass_number))
            .map(Arc::new)
    }
}

/// An in memory periodic table
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PeriodicTable {
    elements: HashMap<Box<str>, Arc<Element>>,
}

impl PeriodicTable {
    /// Create a periodic table from the given elements, later elements replace earlier elements with the same symbol
    pub fn new(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            elements: elements
                .into_iter()
                .map(|e| (e.symbol.clone(), Arc::new(e)))
                .collect(),
        }
    }

    /// The elements that commonly occur in proteomics, with their isotope masses and natural abundances
    pub fn common() -> Self {
        COMMON_TABLE.as_ref().clone()
    }

    /// The same table as [`Self::common`], but shared
    pub fn common_shared() -> Arc<Self> {
        COMMON_TABLE.clone()
    }

    /// The number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if this table is empty
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementProvider for PeriodicTable {
    fn get_element(&self, symbol: &str) -> Option<Arc<Element>> {
        self.elements.get(symbol).cloned()
    }
}

static COMMON_TABLE: LazyLock<Arc<PeriodicTable>> = LazyLock::new(|| {
    Arc::new(PeriodicTable::new(COMMON_ELEMENTS.iter().map(
        |(number, symbol, isotopes)| {
            Element::new(
                *number,
                *symbol,
                isotopes
                    .iter()
                    .map(|(n, mass, abundance)| Isotope::new(*n, *mass, *abundance)),
            )
        },
    )))
});

const COMMON_ELEMENTS: &[(u8, &str, &[(u16, f64, f64)])] = &[
    (1, "H", &[(1, 1.00782503207, 0.999885), (2, 2.0141017778, 0.000115)]),
    (3, "Li", &[(6, 6.015122795, 0.0759), (7, 7.01600455, 0.9241)]),
    (6, "C", &[(12, 12.0, 0.9893), (13, 13.0033548378, 0.0107)]),
    (7, "N", &[(14, 14.0030740048, 0.99636), (15, 15.0001088982, 0.00364)]),
    (
        8,
        "O",
        &[
            (16, 15.99491461956, 0.99757),
            (17, 16.99913170, 0.00038),
            (18, 17.9991610, 0.00205),
        ],
    ),
    (9, "F", &[(19, 18.99840322, 1.0)]),
    (11, "Na", &[(23, 22.9897692809, 1.0)]),
    (
        12,
        "Mg",
        &[
            (24, 23.985041700, 0.7899),
            (25, 24.98583692, 0.1000),
            (26, 25.982592929, 0.1101),
        ],
    ),
    (15, "P", &[(31, 30.97376163, 1.0)]),
    (
        16,
        "S",
        &[
            (32, 31.97207100, 0.9499),
            (33, 32.97145876, 0.0075),
            (34, 33.96786690, 0.0425),
            (36, 35.96708076, 0.0001),
        ],
    ),
    (17, "Cl", &[(35, 34.96885268, 0.7576), (37, 36.96590259, 0.2424)]),
    (
        19,
        "K",
        &[
            (39, 38.96370668, 0.932581),
            (40, 39.96399848, 0.000117),
            (41, 40.96182576, 0.067302),
        ],
    ),
    (
        20,
        "Ca",
        &[
            (40, 39.96259098, 0.96941),
            (42, 41.95861801, 0.00647),
            (43, 42.9587666, 0.00135),
            (44, 43.9554818, 0.02086),
            (46, 45.9536926, 0.00004),
            (48, 47.952534, 0.00187),
        ],
    ),
    (25, "Mn", &[(55, 54.9380451, 1.0)]),
    (
        26,
        "Fe",
        &[
            (54, 53.9396105, 0.05845),
            (56, 55.9349375, 0.91754),
            (57, 56.9353940, 0.02119),
            (58, 57.9332756, 0.00282),
        ],
    ),
    (27, "Co", &[(59, 58.9331950, 1.0)]),
    (
        28,
        "Ni",
        &[
            (58, 57.9353429, 0.680769),
            (60, 59.9307864, 0.262231),
            (61, 60.9310560, 0.011399),
            (62, 61.9283451, 0.036345),
            (64, 63.9279660, 0.009256),
        ],
    ),
    (29, "Cu", &[(63, 62.9295975, 0.6915), (65, 64.9277895, 0.3085)]),
    (
        30,
        "Zn",
        &[
            (64, 63.9291422, 0.48268),
            (66, 65.9260334, 0.27975),
            (67, 66.9271273, 0.04102),
            (68, 67.9248442, 0.19024),
            (70, 69.9253193, 0.00631),
        ],
    ),
    (
        34,
        "Se",
        &[
            (74, 73.9224764, 0.0089),
            (76, 75.9192136, 0.0937),
            (77, 76.9199140, 0.0763),
            (78, 77.9173091, 0.2377),
            (80, 79.9165213, 0.4961),
            (82, 81.9166994, 0.0873),
        ],
    ),
    (35, "Br", &[(79, 78.9183371, 0.5069), (81, 80.9162906, 0.4931)]),
    (53, "I", &[(127, 126.904473, 1.0)]),
];
