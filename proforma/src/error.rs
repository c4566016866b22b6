//! The [`ProFormaErrorKind`] which makes it easy for downstream users to match on the source of an error.

use context_error::ErrorKind;
use serde::{Deserialize, Serialize};

/// The kind of an error, every error raised by this crate is a [`context_error::BoxedError`] with one of these kinds.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ProFormaErrorKind {
    /// Malformed text, either ProForma notation or a chemical formula
    #[default]
    Parse,
    /// A well formed descriptor that could not be resolved into a mass delta
    Lookup,
    /// A semantic conflict found while creating a proteoform group
    Create,
}

impl ErrorKind for ProFormaErrorKind {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        "error"
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}
