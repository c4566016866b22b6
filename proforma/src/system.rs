//! The units used throughout the crate, all masses are stored as [`Mass`] and mostly handled in dalton.

pub use uom::si::f64::Mass;
pub use uom::si::mass::dalton;

/// Create a new mass in dalton
pub fn da(value: f64) -> Mass {
    Mass::new::<dalton>(value)
}

/// The zero mass, used as the start of every summation
pub(crate) fn zero() -> Mass {
    Mass::new::<dalton>(0.0)
}
