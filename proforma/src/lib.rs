#![doc = include_str!("../README.md")]

#[macro_use]
mod helper_functions;

/// Contains all things related to the underlying chemistry.
pub mod chemistry;
mod error;
pub mod glycan;
pub mod ontology;
/// Contains the resolved proteoforms, the residue providers and the factory to build them.
pub mod proteoform;
/// Contains the ProForma model, parser and writer.
pub mod sequence;
pub mod system;

pub use error::ProFormaErrorKind;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::ProFormaErrorKind;
    pub use crate::chemistry::{
        ChemicalFormula, Element, ElementProvider, Isotope, MassMode, PeriodicTable,
    };
    pub use crate::glycan::{GlycanResidueProvider, GlycanResidueTable};
    pub use crate::ontology::{
        BrnoLookup, CompositeLookup, GlycanLookup, Modification, ModificationLookup, Ontology,
        OntologyLookup, OntologyTerm,
    };
    pub use crate::proteoform::{
        AminoAcidTable, ProteoformGroup, ProteoformGroupFactory, Residue, ResidueProvider,
    };
    pub use crate::sequence::{
        ProFormaDescriptor, ProFormaEvidenceType, ProFormaGlobalModification, ProFormaKey,
        ProFormaTag, ProFormaTagGroup, ProFormaTerm,
    };
    pub use crate::system::{Mass, da, dalton};
}

#[cfg(test)]
use paste as _;
#[cfg(test)]
use serde_json as _;
