mod hill;
mod parse;
mod structure;

pub use structure::*;
