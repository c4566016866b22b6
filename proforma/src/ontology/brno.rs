use std::collections::HashMap;

use context_error::*;

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, ElementProvider},
    ontology::{
        MassDelta, Modification, ModificationOrigin,
        lookup::{lookup_error, unhandled},
    },
    sequence::{ProFormaDescriptor, ProFormaEvidenceType, ProFormaKey},
};

/// The BRNO nomenclature for histone modifications, handles names like `B:ac` and `B:me3`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BrnoLookup {
    modifications: HashMap<Box<str>, ChemicalFormula>,
}

impl BrnoLookup {
    /// Build the lookup with the given elements
    /// # Errors
    /// If the elements needed for the BRNO modifications are missing.
    pub fn new(elements: &dyn ElementProvider) -> Result<Self, BoxedError<'static, ProFormaErrorKind>> {
        let mut modifications = HashMap::with_capacity(BRNO_MODIFICATIONS.len());
        for (abbreviation, formula) in BRNO_MODIFICATIONS {
            let formula = ChemicalFormula::parse(formula, elements).map_err(|err| {
                BoxedError::new(
                    ProFormaErrorKind::Lookup,
                    "Invalid BRNO lookup",
                    format!("The formula for '{abbreviation}' could not be built with the given elements"),
                    Context::none(),
                )
                .add_underlying_error(err.to_owned())
            })?;
            modifications.insert(Box::from(*abbreviation), formula);
        }
        Ok(Self { modifications })
    }

    /// Check if this is a BRNO name
    pub fn can_handle(&self, descriptor: &ProFormaDescriptor) -> bool {
        descriptor.affix().is_none()
            && descriptor.key() == ProFormaKey::Name
            && descriptor.evidence_type() == ProFormaEvidenceType::Brno
    }

    /// Find the modification for the abbreviation, the abbreviations are case sensitive
    /// # Errors
    /// If this is not a BRNO name or if the abbreviation is not known.
    pub fn resolve(
        &self,
        descriptor: &ProFormaDescriptor,
    ) -> Result<Modification, BoxedError<'static, ProFormaErrorKind>> {
        if !self.can_handle(descriptor) {
            return Err(unhandled(descriptor, "BRNO"));
        }
        let (abbreviation, formula) = self
            .modifications
            .get_key_value(descriptor.value())
            .ok_or_else(|| {
                let options: Vec<&str> = self.modifications.keys().map(|k| &**k).collect();
                lookup_error(
                    "Unknown modification",
                    "This is not a known BRNO abbreviation",
                    descriptor,
                )
                .suggestions(
                    similar::get_close_matches(descriptor.value(), &options, 3, 0.6)
                        .into_iter()
                        .map(|option| format!("B:{option}")),
                )
            })?;
        Ok(Modification::new(
            ModificationOrigin::Brno(abbreviation.clone()),
            MassDelta::Formula(formula.clone()),
        ))
    }
}

const BRNO_MODIFICATIONS: &[(&str, &str)] = &[
    ("ac", "C2H2O"),
    ("me1", "CH2"),
    ("me2", "C2H4"),
    ("me2s", "C2H4"),
    ("me2a", "C2H4"),
    ("me3", "C3H6"),
    ("ph", "HPO3"),
    ("cr", "C4H4O"),
    ("pr", "C3H4O"),
    ("bu", "C4H6O"),
    ("fo", "CO"),
    ("su", "C4H4O3"),
    ("ma", "C3H2O3"),
    ("hib", "C4H6O2"),
    ("ub", "C4H6N2O2"),
];

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::chemistry::PeriodicTable;

    #[test]
    fn histone_marks() {
        let lookup = BrnoLookup::new(&PeriodicTable::common()).unwrap();
        let acetyl = ProFormaDescriptor::from_token("B", "ac").unwrap();
        assert!(lookup.can_handle(&acetyl));
        let modification = lookup.resolve(&acetyl).unwrap();
        assert_eq!(modification.formula().unwrap().to_string(), "C2H2O");
        assert_eq!(modification.to_string(), "B:ac");
        assert_eq!(
            lookup
                .resolve(&ProFormaDescriptor::from_token("B", "me3").unwrap())
                .unwrap()
                .formula()
                .unwrap()
                .to_string(),
            "C3H6"
        );
    }

    #[test]
    fn unknown() {
        let lookup = BrnoLookup::new(&PeriodicTable::common()).unwrap();
        assert!(!lookup.can_handle(&ProFormaDescriptor::from_value("ac")));
        let error = lookup
            .resolve(&ProFormaDescriptor::from_token("B", "me4").unwrap())
            .unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
        assert!(BrnoLookup::new(&PeriodicTable::new([])).is_err());
    }
}
