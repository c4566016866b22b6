use std::collections::HashMap;

use context_error::*;
use tracing::debug;

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, ElementProvider},
    ontology::{
        MassDelta, Modification, ModificationOrigin, Ontology, OntologyTerm,
        lookup::{lookup_error, unhandled},
    },
    sequence::{ProFormaDescriptor, ProFormaEvidenceType, ProFormaKey},
};

/// A lookup for the names and accessions of a single ontology. The terms are delivered by the
/// caller, who is responsible for reading the ontology files. The entries are stored in a dense
/// list indexed by their numeric id.
///
/// ```rust
/// use proforma::prelude::*;
/// let table = PeriodicTable::common();
/// let unimod = OntologyLookup::new(
///     Ontology::Unimod,
///     [
///         OntologyTerm::new("UNIMOD:35", "Oxidation", Some("O")),
///         OntologyTerm::new("UNIMOD:21", "Phospho", Some("H O(3) P")),
///     ],
///     &table,
/// );
/// let by_name = unimod.resolve(&ProFormaDescriptor::from_value("Phospho")).unwrap();
/// let by_id = unimod
///     .resolve(&ProFormaDescriptor::from_token("UNIMOD", "21").unwrap())
///     .unwrap();
/// assert_eq!(by_name, by_id);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OntologyLookup {
    ontology: Ontology,
    entries: Vec<Option<OntologyEntry>>,
    names: HashMap<Box<str>, u32>,
    resolve_unprefixed_names: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct OntologyEntry {
    name: Box<str>,
    /// The parsed formula, or the original text if it could not be parsed
    formula: Result<ChemicalFormula, Box<str>>,
}

impl OntologyLookup {
    /// The highest numeric id that is stored, terms with a higher id are skipped
    pub const MAXIMUM_ID: u32 = 999_999;

    /// Build the lookup for the given ontology. Terms with an identifier that does not belong to
    /// this ontology, with an id above [`Self::MAXIMUM_ID`], and terms without mass information
    /// are skipped. Terms with a formula that
    /// cannot be parsed are kept, resolving them results in an error. A later term with the same
    /// id replaces an earlier one.
    ///
    /// Names without an ontology prefix (`Oxidation` instead of `U:Oxidation`) are only resolved
    /// by the Unimod lookup, see [`Self::with_unprefixed_names`] to change this.
    pub fn new(
        ontology: Ontology,
        terms: impl IntoIterator<Item = OntologyTerm>,
        elements: &dyn ElementProvider,
    ) -> Self {
        let mut entries: Vec<Option<OntologyEntry>> = Vec::new();
        let mut names = HashMap::new();
        for OntologyTerm { id, name, formula } in terms {
            let Some(number) = ontology.parse_accession(&id) else {
                debug!(%ontology, id = &*id, "skipped ontology term with an invalid identifier");
                continue;
            };
            if number > Self::MAXIMUM_ID {
                debug!(%ontology, id = &*id, "skipped ontology term with an out of range identifier");
                continue;
            }
            let Some(formula) = formula else {
                debug!(%ontology, id = &*id, "skipped ontology term without mass information");
                continue;
            };
            let parsed = ChemicalFormula::parse(&formula, elements).ok();
            if parsed.is_none() {
                debug!(%ontology, id = &*id, formula = &*formula, "ontology term has an invalid formula");
            }
            let index = number as usize;
            if entries.len() <= index {
                entries.resize_with(index + 1, || None);
            }
            if let Some(previous) = &entries[index] {
                let previous = previous.name.to_ascii_lowercase();
                if names.get(previous.as_str()) == Some(&number) {
                    names.remove(previous.as_str());
                }
            }
            names.insert(name.to_ascii_lowercase().into_boxed_str(), number);
            entries[index] = Some(OntologyEntry {
                name,
                formula: parsed.ok_or(formula),
            });
        }
        debug!(%ontology, entries = names.len(), "built ontology lookup");
        Self {
            ontology,
            entries,
            names,
            resolve_unprefixed_names: ontology == Ontology::Unimod,
        }
    }

    /// Set if names without an ontology prefix are resolved by this lookup
    #[must_use]
    pub const fn with_unprefixed_names(mut self, resolve: bool) -> Self {
        self.resolve_unprefixed_names = resolve;
        self
    }

    /// The ontology of this lookup
    pub const fn ontology(&self) -> Ontology {
        self.ontology
    }

    /// The number of entries
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Check if the descriptor is a name or accession for this ontology
    pub fn can_handle(&self, descriptor: &ProFormaDescriptor) -> bool {
        if descriptor.affix().is_some() {
            return false;
        }
        match descriptor.key() {
            ProFormaKey::Identifier => {
                descriptor.evidence_type() == self.ontology.evidence_type()
            }
            ProFormaKey::Name => {
                descriptor.evidence_type() == self.ontology.evidence_type()
                    || (self.resolve_unprefixed_names
                        && descriptor.evidence_type() == ProFormaEvidenceType::None)
            }
            _ => false,
        }
    }

    /// Find the entry for the descriptor and resolve its formula
    /// # Errors
    /// If the descriptor is not handled by this lookup, if the accession or name is not
    /// known, or if the entry has a malformed formula.
    pub fn resolve(
        &self,
        descriptor: &ProFormaDescriptor,
    ) -> Result<Modification, BoxedError<'static, ProFormaErrorKind>> {
        if !self.can_handle(descriptor) {
            return Err(unhandled(descriptor, &self.ontology.to_string()));
        }
        let id = if descriptor.key() == ProFormaKey::Identifier {
            let id = self
                .ontology
                .parse_accession(descriptor.value())
                .ok_or_else(|| {
                    lookup_error(
                        "Invalid accession",
                        format!("This is not a valid {} accession", self.ontology),
                        descriptor,
                    )
                })?;
            if self.entry(id).is_none() {
                return Err(lookup_error(
                    "Unknown modification",
                    format!(
                        "The accession {} does not exist in {}",
                        self.ontology.accession(id),
                        self.ontology
                    ),
                    descriptor,
                ));
            }
            id
        } else {
            *self
                .names
                .get(descriptor.value().to_ascii_lowercase().as_str())
                .ok_or_else(|| {
                    lookup_error(
                        "Unknown modification",
                        format!("The name does not exist in {}", self.ontology),
                        descriptor,
                    )
                    .suggestions(self.similar_names(descriptor.value()))
                })?
        };
        let entry = self.entry(id).ok_or_else(|| {
            lookup_error(
                "Unknown modification",
                format!("The name does not exist in {}", self.ontology),
                descriptor,
            )
        })?;
        match &entry.formula {
            Ok(formula) => Ok(Modification::new(
                ModificationOrigin::Ontology {
                    ontology: self.ontology,
                    id,
                    name: entry.name.clone(),
                },
                MassDelta::Formula(formula.clone()),
            )),
            Err(text) => Err(lookup_error(
                "Invalid modification",
                format!(
                    "The formula '{text}' of {} ({}) could not be parsed",
                    self.ontology.accession(id),
                    entry.name
                ),
                descriptor,
            )),
        }
    }

    fn entry(&self, id: u32) -> Option<&OntologyEntry> {
        self.entries.get(id as usize).and_then(Option::as_ref)
    }

    /// The closest names, written with the prefix of this ontology
    fn similar_names(&self, name: &str) -> Vec<String> {
        let options: Vec<&str> = self.entries.iter().flatten().map(|e| &*e.name).collect();
        let prefix = self.ontology.evidence_type().name_prefix().unwrap_or_default();
        similar::get_close_matches(name, &options, 3, 0.7)
            .into_iter()
            .map(|option| format!("{prefix}:{option}"))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::{chemistry::PeriodicTable, system::dalton};

    fn unimod() -> OntologyLookup {
        OntologyLookup::new(
            Ontology::Unimod,
            [OntologyTerm::new("37", "Trimethyl", Some("H(6) C(3)"))],
            &PeriodicTable::common(),
        )
    }

    fn identifier(value: &str) -> ProFormaDescriptor {
        ProFormaDescriptor::new(
            ProFormaKey::Identifier,
            ProFormaEvidenceType::Unimod,
            value,
        )
    }

    #[test]
    fn seeded_with_one_term() {
        let lookup = unimod();
        assert_eq!(lookup.len(), 1);
        let missing = lookup.resolve(&identifier("UNIMOD:1")).unwrap_err();
        assert_eq!(missing.get_kind(), ProFormaErrorKind::Lookup);
        let bare = lookup.resolve(&identifier("37")).unwrap();
        let prefixed = lookup.resolve(&identifier("UNIMOD:37")).unwrap();
        assert_eq!(
            bare.mass(crate::chemistry::MassMode::Monoisotopic),
            prefixed.mass(crate::chemistry::MassMode::Monoisotopic)
        );
        assert!(
            (bare
                .mass(crate::chemistry::MassMode::Monoisotopic)
                .get::<dalton>()
                - 42.04695)
                .abs()
                < 1e-4
        );
        assert!(lookup.resolve(&identifier("UNIMOD:99999")).is_err());
        assert!(lookup.resolve(&identifier("UNIMOD:abc")).is_err());
    }

    #[test]
    fn names() {
        let lookup = unimod();
        let name = ProFormaDescriptor::from_value("trimethyl");
        assert!(lookup.can_handle(&name));
        assert!(lookup.resolve(&name).is_ok());
        let error = lookup
            .resolve(&ProFormaDescriptor::from_value("Trimethl"))
            .unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);

        let strict = unimod().with_unprefixed_names(false);
        assert!(!strict.can_handle(&name));
        assert!(strict.can_handle(&ProFormaDescriptor::from_token("U", "Trimethyl").unwrap()));
        assert!(!strict.can_handle(&ProFormaDescriptor::from_token("M", "Trimethyl").unwrap()));
        assert_eq!(
            strict.resolve(&name).unwrap_err().get_kind(),
            ProFormaErrorKind::Lookup
        );
    }

    #[test]
    fn out_of_range_id() {
        let lookup = OntologyLookup::new(
            Ontology::Unimod,
            [
                OntologyTerm::new("UNIMOD:4000000000", "Huge", Some("O")),
                OntologyTerm::new("UNIMOD:999999", "Largest", Some("N")),
            ],
            &PeriodicTable::common(),
        );
        assert_eq!(lookup.len(), 1);
        let error = lookup.resolve(&identifier("UNIMOD:4000000000")).unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
        let error = lookup
            .resolve(&ProFormaDescriptor::from_value("Huge"))
            .unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
        assert!(lookup.resolve(&identifier("UNIMOD:999999")).is_ok());
    }

    #[test]
    fn replaced_term_drops_old_name() {
        let lookup = OntologyLookup::new(
            Ontology::Unimod,
            [
                OntologyTerm::new("UNIMOD:35", "OldName", Some("O")),
                OntologyTerm::new("UNIMOD:35", "Oxidation", Some("O")),
            ],
            &PeriodicTable::common(),
        );
        assert_eq!(lookup.len(), 1);
        let error = lookup
            .resolve(&ProFormaDescriptor::from_value("OldName"))
            .unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
        let oxidation = lookup
            .resolve(&ProFormaDescriptor::from_value("oxidation"))
            .unwrap();
        assert_eq!(oxidation.formula().unwrap().to_string(), "O");

        let renamed_back = OntologyLookup::new(
            Ontology::Unimod,
            [
                OntologyTerm::new("UNIMOD:35", "Oxidation", Some("O")),
                OntologyTerm::new("UNIMOD:36", "Oxidation", Some("N")),
                OntologyTerm::new("UNIMOD:35", "Other", Some("O")),
            ],
            &PeriodicTable::common(),
        );
        let kept = renamed_back
            .resolve(&ProFormaDescriptor::from_value("Oxidation"))
            .unwrap();
        assert_eq!(kept.formula().unwrap().to_string(), "N");
    }

    #[test]
    fn skipped_and_malformed_terms() {
        let lookup = OntologyLookup::new(
            Ontology::Resid,
            [
                OntologyTerm::new("AA0037", "O-phospho-L-serine", Some("H 1 O 3 P 1")),
                OntologyTerm::new("AA0038", "No mass", None::<&str>),
                OntologyTerm::new("XX12", "Wrong id", Some("C 1")),
                OntologyTerm::new("RESID:AA0040", "Broken", Some("C 1 Qq 2")),
            ],
            &PeriodicTable::common(),
        );
        assert_eq!(lookup.len(), 2);
        let resid = |value: &str| {
            ProFormaDescriptor::new(ProFormaKey::Identifier, ProFormaEvidenceType::Resid, value)
        };
        let phospho = lookup.resolve(&resid("RESID:AA0037")).unwrap();
        assert_eq!(phospho.formula().unwrap().to_string(), "HO3P");
        assert!(lookup.resolve(&resid("RESID:AA0038")).is_err());
        let broken = lookup.resolve(&resid("RESID:AA0040")).unwrap_err();
        assert_eq!(broken.get_kind(), ProFormaErrorKind::Lookup);
        assert!(!lookup.can_handle(&ProFormaDescriptor::from_value("Broken")));
    }
}
