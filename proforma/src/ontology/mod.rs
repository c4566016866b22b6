//! Resolve ProForma descriptors into mass changes.
//!
//! A [`ModificationLookup`] knows which descriptors it can handle ([`ModificationLookup::can_handle`])
//! and turns those into a [`Modification`] ([`ModificationLookup::resolve`]). The simple lookups
//! handle masses, formulas and glycan compositions, the [`OntologyLookup`] handles names and
//! accessions from an ontology that was loaded by the caller, and a [`CompositeLookup`]
//! combines any number of lookups.

mod brno;
mod composite;
mod lookup;
mod modification;
mod ontology;
mod ontology_lookup;

pub use brno::*;
pub use composite::*;
pub use lookup::*;
pub use modification::*;
pub use ontology::*;
pub use ontology_lookup::*;
