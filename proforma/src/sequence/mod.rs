mod descriptor;
mod parse;
mod tag;
mod term;
#[cfg(test)]
mod tests;
mod write;

pub use descriptor::*;
pub use tag::*;
pub use term::*;
