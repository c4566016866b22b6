mod factory;
mod group;
mod residue;

pub use factory::*;
pub use group::*;
pub use residue::*;
