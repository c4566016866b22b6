use std::sync::Arc;

use context_error::*;

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, ElementProvider},
    glycan::{GlycanComposition, GlycanResidueProvider},
    ontology::{
        BrnoLookup, CompositeLookup, MassDelta, Modification, ModificationOrigin, OntologyLookup,
    },
    sequence::{ProFormaDescriptor, ProFormaKey},
};

/// A source of modifications. Every lookup handles a specific set of descriptors, only those
/// descriptors for which [`Self::can_handle`] is true can be resolved.
/// ```rust
/// use proforma::prelude::*;
/// let lookup = ModificationLookup::formula(PeriodicTable::common_shared());
/// let descriptor = ProFormaDescriptor::new(ProFormaKey::Formula, ProFormaEvidenceType::None, "HPO3");
/// assert!(lookup.can_handle(&descriptor));
/// let modification = lookup.resolve(&descriptor).unwrap();
/// assert!((modification.mass(MassMode::Monoisotopic).get::<dalton>() - 79.966331).abs() < 1e-5);
/// ```
#[derive(Clone, Debug)]
pub enum ModificationLookup {
    /// Mass shifts, eg `+15.995` or `Obs:+15.995`
    Mass,
    /// Chemical formulas, eg `Formula:C2H2O`
    Formula(FormulaLookup),
    /// Glycan compositions, eg `Glycan:HexNAc2Hex3`
    Glycan(GlycanLookup),
    /// Names and accessions from a single ontology
    Ontology(OntologyLookup),
    /// BRNO histone modification abbreviations
    Brno(BrnoLookup),
    /// Multiple lookups tried in order
    Composite(CompositeLookup),
}

impl ModificationLookup {
    /// A lookup for chemical formulas with the given elements
    pub fn formula(elements: Arc<dyn ElementProvider + Send + Sync>) -> Self {
        Self::Formula(FormulaLookup::new(elements))
    }

    /// A lookup for glycan compositions with the given glycan residues
    pub fn glycan(residues: Arc<dyn GlycanResidueProvider + Send + Sync>) -> Self {
        Self::Glycan(GlycanLookup::new(residues))
    }

    /// Check if this lookup can resolve the given descriptor
    pub fn can_handle(&self, descriptor: &ProFormaDescriptor) -> bool {
        match self {
            Self::Mass => descriptor.affix().is_none() && descriptor.key() == ProFormaKey::Mass,
            Self::Formula(lookup) => lookup.can_handle(descriptor),
            Self::Glycan(lookup) => lookup.can_handle(descriptor),
            Self::Ontology(lookup) => lookup.can_handle(descriptor),
            Self::Brno(lookup) => lookup.can_handle(descriptor),
            Self::Composite(lookup) => lookup.can_handle(descriptor),
        }
    }

    /// Resolve the given descriptor into a modification
    /// # Errors
    /// If this lookup cannot handle the descriptor, or if the descriptor refers to something
    /// that is not known or is malformed.
    pub fn resolve(
        &self,
        descriptor: &ProFormaDescriptor,
    ) -> Result<Modification, BoxedError<'static, ProFormaErrorKind>> {
        match self {
            Self::Mass => {
                if !self.can_handle(descriptor) {
                    return Err(unhandled(descriptor, "mass"));
                }
                match descriptor.value().parse::<f64>() {
                    Ok(mass) if mass.is_finite() => Ok(Modification::mass_shift(mass)),
                    _ => Err(lookup_error(
                        "Invalid mass",
                        "The mass is not a finite number",
                        descriptor,
                    )),
                }
            }
            Self::Formula(lookup) => lookup.resolve(descriptor),
            Self::Glycan(lookup) => lookup.resolve(descriptor),
            Self::Ontology(lookup) => lookup.resolve(descriptor),
            Self::Brno(lookup) => lookup.resolve(descriptor),
            Self::Composite(lookup) => lookup.resolve(descriptor),
        }
    }
}

impl From<FormulaLookup> for ModificationLookup {
    fn from(value: FormulaLookup) -> Self {
        Self::Formula(value)
    }
}

impl From<GlycanLookup> for ModificationLookup {
    fn from(value: GlycanLookup) -> Self {
        Self::Glycan(value)
    }
}

impl From<OntologyLookup> for ModificationLookup {
    fn from(value: OntologyLookup) -> Self {
        Self::Ontology(value)
    }
}

impl From<BrnoLookup> for ModificationLookup {
    fn from(value: BrnoLookup) -> Self {
        Self::Brno(value)
    }
}

impl From<CompositeLookup> for ModificationLookup {
    fn from(value: CompositeLookup) -> Self {
        Self::Composite(value)
    }
}

/// Resolve `Formula:` descriptors
#[derive(Clone)]
pub struct FormulaLookup {
    elements: Arc<dyn ElementProvider + Send + Sync>,
}

impl std::fmt::Debug for FormulaLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormulaLookup").finish_non_exhaustive()
    }
}

impl FormulaLookup {
    /// Create a formula lookup with the given elements
    pub fn new(elements: Arc<dyn ElementProvider + Send + Sync>) -> Self {
        Self { elements }
    }

    /// Check if this is a formula descriptor
    pub fn can_handle(&self, descriptor: &ProFormaDescriptor) -> bool {
        descriptor.affix().is_none() && descriptor.key() == ProFormaKey::Formula
    }

    /// Parse the formula of the descriptor
    /// # Errors
    /// If this is not a formula descriptor or if the formula cannot be parsed.
    pub fn resolve(
        &self,
        descriptor: &ProFormaDescriptor,
    ) -> Result<Modification, BoxedError<'static, ProFormaErrorKind>> {
        if !self.can_handle(descriptor) {
            return Err(unhandled(descriptor, "formula"));
        }
        ChemicalFormula::parse(descriptor.value(), self.elements.as_ref())
            .map(Modification::from_formula)
            .map_err(|err| {
                lookup_error(
                    "Invalid formula",
                    "The formula of this modification could not be parsed",
                    descriptor,
                )
                .add_underlying_error(err.to_owned())
            })
    }
}

/// Resolve `Glycan:` descriptors
#[derive(Clone)]
pub struct GlycanLookup {
    residues: Arc<dyn GlycanResidueProvider + Send + Sync>,
}

impl std::fmt::Debug for GlycanLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlycanLookup").finish_non_exhaustive()
    }
}

impl GlycanLookup {
    /// Create a glycan lookup with the given glycan residues
    pub fn new(residues: Arc<dyn GlycanResidueProvider + Send + Sync>) -> Self {
        Self { residues }
    }

    /// Check if this is a glycan composition descriptor
    pub fn can_handle(&self, descriptor: &ProFormaDescriptor) -> bool {
        descriptor.affix().is_none() && descriptor.key() == ProFormaKey::Glycan
    }

    /// Parse the glycan composition of the descriptor
    /// # Errors
    /// If this is not a glycan descriptor or if the composition contains unknown residues.
    pub fn resolve(
        &self,
        descriptor: &ProFormaDescriptor,
    ) -> Result<Modification, BoxedError<'static, ProFormaErrorKind>> {
        if !self.can_handle(descriptor) {
            return Err(unhandled(descriptor, "glycan"));
        }
        let composition = GlycanComposition::parse(descriptor.value(), self.residues.as_ref())
            .map_err(|err| err.to_owned())?;
        Ok(Modification::new(
            ModificationOrigin::Glycan(composition.residues().iter().cloned().collect()),
            MassDelta::Formula(composition.formula().clone()),
        ))
    }
}

/// Create a lookup error that shows the descriptor
pub(super) fn lookup_error(
    short: impl Into<String>,
    long: impl Into<String>,
    descriptor: &ProFormaDescriptor,
) -> BoxedError<'static, ProFormaErrorKind> {
    BoxedError::new(
        ProFormaErrorKind::Lookup,
        short.into(),
        long.into(),
        Context::show(descriptor.to_string()),
    )
}

/// The error for a descriptor that was given to a lookup that cannot handle it
pub(super) fn unhandled(
    descriptor: &ProFormaDescriptor,
    lookup: &str,
) -> BoxedError<'static, ProFormaErrorKind> {
    lookup_error(
        "Unsupported modification",
        format!("The {lookup} lookup cannot resolve this modification"),
        descriptor,
    )
}
