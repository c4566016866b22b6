use context_error::*;
use tracing::trace;

use crate::{
    ProFormaErrorKind,
    ontology::{Modification, ModificationLookup, lookup::lookup_error},
    sequence::ProFormaDescriptor,
};

/// Combine multiple lookups, a descriptor is resolved by the first lookup that can handle it
/// ```rust
/// use proforma::prelude::*;
/// let table = PeriodicTable::common_shared();
/// let lookup = CompositeLookup::default()
///     .with(ModificationLookup::Mass)
///     .with(ModificationLookup::formula(table.clone()))
///     .with(BrnoLookup::new(table.as_ref()).unwrap());
/// assert!(lookup.can_handle(&ProFormaDescriptor::from_value("+15.995")));
/// assert!(lookup.can_handle(&ProFormaDescriptor::from_token("B", "ac").unwrap()));
/// assert!(!lookup.can_handle(&ProFormaDescriptor::from_value("Oxidation")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct CompositeLookup {
    lookups: Vec<ModificationLookup>,
}

impl CompositeLookup {
    /// Create a composite from the given lookups, in order of priority
    pub fn new(lookups: impl IntoIterator<Item = ModificationLookup>) -> Self {
        Self {
            lookups: lookups.into_iter().collect(),
        }
    }

    /// Add a lookup with the lowest priority
    #[must_use]
    pub fn with(mut self, lookup: impl Into<ModificationLookup>) -> Self {
        self.lookups.push(lookup.into());
        self
    }

    /// The lookups, in order of priority
    pub fn lookups(&self) -> &[ModificationLookup] {
        &self.lookups
    }

    /// Check if any of the lookups can handle this descriptor
    pub fn can_handle(&self, descriptor: &ProFormaDescriptor) -> bool {
        self.lookups.iter().any(|l| l.can_handle(descriptor))
    }

    /// Resolve the descriptor with the first lookup that can handle it. Later lookups are not
    /// tried if that lookup fails.
    /// # Errors
    /// If none of the lookups can handle the descriptor, or the error of the lookup that handled it.
    pub fn resolve(
        &self,
        descriptor: &ProFormaDescriptor,
    ) -> Result<Modification, BoxedError<'static, ProFormaErrorKind>> {
        let (index, lookup) = self
            .lookups
            .iter()
            .enumerate()
            .find(|(_, l)| l.can_handle(descriptor))
            .ok_or_else(|| {
                lookup_error(
                    "Unsupported modification",
                    "None of the configured lookups can resolve this modification",
                    descriptor,
                )
            })?;
        trace!(%descriptor, index, "resolving with composite member");
        lookup.resolve(descriptor)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::{
        chemistry::PeriodicTable,
        ontology::{Ontology, OntologyLookup, OntologyTerm},
    };

    fn ontology(ontology: Ontology, name: &str, formula: &str) -> OntologyLookup {
        OntologyLookup::new(
            ontology,
            [OntologyTerm::new("1", name, Some(formula))],
            &PeriodicTable::common(),
        )
    }

    #[test]
    fn first_capable_wins() {
        let lookup = CompositeLookup::new([
            ontology(Ontology::Unimod, "Shared", "O").into(),
            ontology(Ontology::Psimod, "Shared", "N")
                .with_unprefixed_names(true)
                .into(),
        ]);
        let modification = lookup
            .resolve(&ProFormaDescriptor::from_value("Shared"))
            .unwrap();
        assert_eq!(modification.formula().unwrap().to_string(), "O");
        let psimod = lookup
            .resolve(&ProFormaDescriptor::from_token("M", "Shared").unwrap())
            .unwrap();
        assert_eq!(psimod.formula().unwrap().to_string(), "N");
    }

    #[test]
    fn failing_member_is_final() {
        let lookup = CompositeLookup::default()
            .with(ontology(Ontology::Unimod, "Other", "O"))
            .with(
                ontology(Ontology::Psimod, "Missing", "N").with_unprefixed_names(true),
            );
        assert!(lookup.resolve(&ProFormaDescriptor::from_value("Missing")).is_err());
        let error = lookup
            .resolve(&ProFormaDescriptor::from_token("Formula", "O").unwrap())
            .unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
        assert_eq!(lookup.lookups().len(), 2);
    }
}
