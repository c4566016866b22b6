//! Monosaccharide residues and glycan compositions, as used by `Glycan:` descriptors.

mod composition;
mod residues;

pub use composition::*;
pub use residues::*;
