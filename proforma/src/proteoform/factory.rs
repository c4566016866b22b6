use std::{fmt::Display, sync::Arc};

use context_error::*;
use tracing::trace;

use crate::{
    ProFormaErrorKind,
    chemistry::{ChemicalFormula, Element, ElementProvider},
    ontology::{Modification, ModificationLookup},
    proteoform::{GroupedModification, ProteoformGroup, RangedModification, ResidueProvider},
    sequence::{ProFormaDescriptor, ProFormaKey, ProFormaTerm},
};

/// Resolves [`ProFormaTerm`]s into [`ProteoformGroup`]s
/// ```rust
/// use proforma::prelude::*;
/// let elements = PeriodicTable::common_shared();
/// let residues = AminoAcidTable::new(elements.as_ref()).unwrap();
/// let factory = ProteoformGroupFactory::new(elements);
/// let group = factory
///     .create(&ProFormaTerm::parse("PEPTIDE").unwrap(), &residues, None)
///     .unwrap();
/// assert!((group.monoisotopic_mass().get::<dalton>() - 799.359964).abs() < 1e-5);
/// ```
#[derive(Clone)]
pub struct ProteoformGroupFactory {
    elements: Arc<dyn ElementProvider + Send + Sync>,
}

impl std::fmt::Debug for ProteoformGroupFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProteoformGroupFactory").finish_non_exhaustive()
    }
}

/// The place in the term where descriptors are resolved
#[derive(Clone, Copy, Debug)]
enum Site<'a> {
    NTerm,
    CTerm,
    Residue(usize),
    Range(usize, usize),
    Group(&'a str),
    Unlocalized,
    Labile,
    Global,
}

impl Display for Site<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NTerm => write!(f, "the N terminus"),
            Self::CTerm => write!(f, "the C terminus"),
            Self::Residue(index) => write!(f, "residue {index}"),
            Self::Range(start, end) => write!(f, "range {start}..={end}"),
            Self::Group(name) => write!(f, "group {name}"),
            Self::Unlocalized => write!(f, "an unlocalized tag"),
            Self::Labile => write!(f, "a labile tag"),
            Self::Global => write!(f, "a global modification"),
        }
    }
}

impl ProteoformGroupFactory {
    /// Create a factory, the elements are used for the water and for isotope labels
    pub fn new(elements: Arc<dyn ElementProvider + Send + Sync>) -> Self {
        Self { elements }
    }

    /// Resolve a term into a proteoform group. All descriptors on a single tag have to resolve
    /// into the same modification, a second tag on the same residue is an additional
    /// modification. Informational descriptors and ambiguity markers are skipped.
    ///
    /// Global fixed modifications are placed on every matching residue, if that residue already
    /// has a modification it has to be the same modification. Global isotope labels are applied
    /// to all formulas in the group.
    /// # Errors
    /// * A `Create` error if a residue is not known, if there are descriptors but no lookup, if
    ///   the lookup cannot handle a descriptor, if descriptors on a single site resolve to
    ///   different modifications, or if an isotope label is invalid.
    /// * A `Lookup` error if the lookup fails to resolve a descriptor.
    pub fn create(
        &self,
        term: &ProFormaTerm,
        residues: &dyn ResidueProvider,
        lookup: Option<&ModificationLookup>,
    ) -> Result<ProteoformGroup, BoxedError<'static, ProFormaErrorKind>> {
        let mut group = ProteoformGroup {
            residues: term
                .sequence()
                .chars()
                .enumerate()
                .map(|(index, symbol)| {
                    residues.get_residue(symbol).ok_or_else(|| {
                        BoxedError::new(
                            ProFormaErrorKind::Create,
                            "Unknown residue",
                            format!("The residue '{symbol}' at index {index} is not known"),
                            Context::none()
                                .lines(0, term.sequence().to_string())
                                .add_highlight((0, index, 1)),
                        )
                    })
                })
                .collect::<Result<_, _>>()?,
            n_term: resolve_site(term.n_term(), Site::NTerm, lookup)?,
            c_term: resolve_site(term.c_term(), Site::CTerm, lookup)?,
            localized: Vec::new(),
            ranged: Vec::new(),
            grouped: Vec::new(),
            unlocalized: Vec::new(),
            labile: Vec::new(),
            water: ChemicalFormula::parse("H2O", self.elements.as_ref()).map_err(|err| {
                BoxedError::new(
                    ProFormaErrorKind::Create,
                    "Missing elements",
                    "The elements for water are not known",
                    Context::none(),
                )
                .add_underlying_error(err.to_owned())
            })?,
        };

        for tag in term.tags() {
            if tag.is_range() {
                if let Some(modification) =
                    resolve_site(tag.descriptors(), Site::Range(tag.start(), tag.end()), lookup)?
                {
                    group.ranged.push(RangedModification {
                        modification,
                        start: tag.start(),
                        end: tag.end(),
                    });
                }
            } else if let Some(modification) =
                resolve_site(tag.descriptors(), Site::Residue(tag.start()), lookup)?
            {
                group.localized.push((modification, tag.start()));
            }
        }

        for tag_group in term.tag_groups() {
            if let Some(modification) = resolve_site(
                std::slice::from_ref(tag_group.descriptor()),
                Site::Group(tag_group.name()),
                lookup,
            )? {
                group.grouped.push(GroupedModification {
                    name: tag_group.name().to_string(),
                    modification,
                    candidates: tag_group.memberships().to_vec(),
                    preferred_location: tag_group.preferred_location(),
                });
            }
        }

        for tag in term.unlocalized() {
            if let Some(modification) = resolve_site(&tag.descriptors, Site::Unlocalized, lookup)? {
                group.unlocalized.push((modification, tag.count));
            }
        }

        for descriptor in term.labile() {
            if let Some(modification) =
                resolve_site(std::slice::from_ref(descriptor), Site::Labile, lookup)?
            {
                group.labile.push(modification);
            }
        }

        let mut labels = Vec::new();
        for global in term.global_modifications() {
            if let Some(label) = global.isotope_label() {
                labels.push(self.isotope_label(label)?);
            } else if let Some(targets) = &global.target_residues
                && let Some(modification) =
                    resolve_site(&global.descriptors, Site::Global, lookup)?
            {
                for (index, _) in term
                    .sequence()
                    .char_indices()
                    .filter(|(_, symbol)| targets.contains(symbol))
                {
                    place_fixed(&mut group.localized, modification.clone(), index)?;
                }
            }
        }
        group.localized.sort_by_key(|(_, index)| *index);

        for label in &labels {
            trace!(label = %label, "applying isotope label");
            apply_isotope_label(&mut group, label);
        }
        Ok(group)
    }

    /// Find the element for an isotope label, `13C` or `D` for deuterium
    fn isotope_label(
        &self,
        label: &str,
    ) -> Result<Arc<Element>, BoxedError<'static, ProFormaErrorKind>> {
        let digits = label.bytes().take_while(u8::is_ascii_digit).count();
        let (symbol, mass_number) = if label == "D" {
            ("H", Some(2))
        } else {
            (&label[digits..], label[..digits].parse::<u16>().ok())
        };
        mass_number
            .and_then(|mass_number| self.elements.get_element_isotope(symbol, mass_number))
            .ok_or_else(|| {
                BoxedError::new(
                    ProFormaErrorKind::Create,
                    "Invalid isotope label",
                    "An isotope label has to be a known isotope, eg '13C', '15N' or 'D'",
                    Context::show(label.to_string()),
                )
            })
    }
}

/// Resolve all descriptors on a single site, returns None if there are no descriptors that carry chemistry
fn resolve_site(
    descriptors: &[ProFormaDescriptor],
    site: Site<'_>,
    lookup: Option<&ModificationLookup>,
) -> Result<Option<Modification>, BoxedError<'static, ProFormaErrorKind>> {
    let mut resolved: Option<Modification> = None;
    for descriptor in descriptors
        .iter()
        .filter(|d| d.affix().is_none() && !matches!(d.key(), ProFormaKey::Info | ProFormaKey::None))
    {
        let lookup = lookup.ok_or_else(|| {
            create_error(
                "Missing lookup",
                format!("A modification lookup is needed to resolve the modification on {site}"),
                descriptor,
            )
        })?;
        if !lookup.can_handle(descriptor) {
            return Err(create_error(
                "Unsupported modification",
                format!("None of the lookups can resolve the modification on {site}"),
                descriptor,
            ));
        }
        let modification = lookup.resolve(descriptor)?;
        trace!(%site, %descriptor, %modification, "resolved descriptor");
        match &resolved {
            None => resolved = Some(modification),
            Some(canonical) if canonical.is_equivalent(&modification) => (),
            Some(canonical) => {
                return Err(create_error(
                    "Conflicting modifications",
                    format!(
                        "The modification on {site} resolves to {modification}, which is different from the earlier {canonical}"
                    ),
                    descriptor,
                ));
            }
        }
    }
    Ok(resolved)
}

/// Place a global fixed modification, a residue that already carries a modification has to carry the same one
fn place_fixed(
    localized: &mut Vec<(Modification, usize)>,
    modification: Modification,
    index: usize,
) -> Result<(), BoxedError<'static, ProFormaErrorKind>> {
    if let Some((existing, _)) = localized.iter().find(|(_, i)| *i == index) {
        if existing.is_equivalent(&modification) {
            return Ok(());
        }
        return Err(BoxedError::new(
            ProFormaErrorKind::Create,
            "Conflicting modifications",
            format!(
                "The global modification {modification} cannot be placed on residue {index}, which already has {existing}"
            ),
            Context::none(),
        ));
    }
    localized.push((modification, index));
    Ok(())
}

fn apply_isotope_label(group: &mut ProteoformGroup, label: &Arc<Element>) {
    let relabel = |m: &mut Modification| *m = m.with_isotope_label(label);
    for residue in &mut group.residues {
        residue.formula = residue.formula.with_isotope_label(label);
    }
    group.water = group.water.with_isotope_label(label);
    group.n_term.iter_mut().for_each(relabel);
    group.c_term.iter_mut().for_each(relabel);
    group.localized.iter_mut().for_each(|(m, _)| relabel(m));
    group
        .ranged
        .iter_mut()
        .for_each(|r| relabel(&mut r.modification));
    group
        .grouped
        .iter_mut()
        .for_each(|g| relabel(&mut g.modification));
    group.unlocalized.iter_mut().for_each(|(m, _)| relabel(m));
    group.labile.iter_mut().for_each(relabel);
}

fn create_error(
    short: impl Into<String>,
    long: impl Into<String>,
    descriptor: &ProFormaDescriptor,
) -> BoxedError<'static, ProFormaErrorKind> {
    BoxedError::new(
        ProFormaErrorKind::Create,
        short.into(),
        long.into(),
        Context::show(descriptor.to_string()),
    )
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::{
        chemistry::{MassMode, PeriodicTable},
        glycan::GlycanResidueTable,
        ontology::CompositeLookup,
        proteoform::AminoAcidTable,
        system::{da, dalton},
    };

    struct Setup {
        factory: ProteoformGroupFactory,
        residues: AminoAcidTable,
        lookup: ModificationLookup,
    }

    fn setup() -> Setup {
        let elements = PeriodicTable::common_shared();
        let glycans = GlycanResidueTable::common(elements.as_ref()).unwrap();
        Setup {
            residues: AminoAcidTable::new(elements.as_ref()).unwrap(),
            lookup: CompositeLookup::default()
                .with(ModificationLookup::Mass)
                .with(ModificationLookup::formula(elements.clone()))
                .with(ModificationLookup::glycan(Arc::new(glycans)))
                .into(),
            factory: ProteoformGroupFactory::new(elements),
        }
    }

    impl Setup {
        fn create(
            &self,
            text: &str,
        ) -> Result<ProteoformGroup, BoxedError<'static, ProFormaErrorKind>> {
            let term = ProFormaTerm::parse(text).unwrap();
            self.factory.create(&term, &self.residues, Some(&self.lookup))
        }

        fn shift(&self, text: &str, base: &str) -> f64 {
            (self.create(text).unwrap().monoisotopic_mass()
                - self.create(base).unwrap().monoisotopic_mass())
            .get::<dalton>()
        }
    }

    #[test]
    fn mass_additivity() {
        let setup = setup();
        let group = setup
            .create("[Formula:C2H2O]-PEPS[+79.966331]TIDE-[Formula:H-1N1O-1]")
            .unwrap();
        assert_eq!(group.localized().len(), 1);
        assert_eq!(group.localized()[0].1, 3);
        for mode in [MassMode::Monoisotopic, MassMode::Average] {
            let expected = group.water().mass(mode)
                + group
                    .residues()
                    .iter()
                    .fold(da(0.0), |acc, r| acc + r.formula.mass(mode))
                + group.n_term().unwrap().mass(mode)
                + group.c_term().unwrap().mass(mode)
                + group.localized()[0].0.mass(mode);
            assert!((group.mass(mode) - expected).get::<dalton>().abs() < 1e-9);
        }
        assert!(group.formula().is_none());
        assert!((setup.shift("[Formula:C2H2O]-PEPTIDE", "PEPTIDE") - 42.010565).abs() < 1e-5);
    }

    #[test]
    fn site_conflicts() {
        let setup = setup();
        let conflict = setup.create("PEPS[+79.966|Formula:HPO3]TIDE").unwrap_err();
        assert_eq!(conflict.get_kind(), ProFormaErrorKind::Create);
        let same = setup.create("PEPS[Formula:HPO3|Formula:H P O3]TIDE").unwrap();
        assert_eq!(same.localized().len(), 1);
        let stacked = setup.create("PEPS[Formula:HPO3][+1]TIDE").unwrap();
        assert_eq!(stacked.localized().len(), 2);
    }

    #[test]
    fn missing_or_unsupported_lookup() {
        let setup = setup();
        let term = ProFormaTerm::parse("PEPS[+79.966]TIDE").unwrap();
        let error = setup
            .factory
            .create(&term, &setup.residues, None)
            .unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Create);
        let error = setup.create("PEPS[Phospho]TIDE").unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Create);
        let error = setup.create("PEPS[Formula:Xx]TIDE").unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Lookup);
        let error = setup.create("PEPXIDE").unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Create);
    }

    #[test]
    fn skipped_descriptors() {
        let setup = setup();
        let term = ProFormaTerm::parse("PEPT[info:maybe]IDE").unwrap();
        let group = setup.factory.create(&term, &setup.residues, None).unwrap();
        assert!(group.localized().is_empty());
        assert_eq!(group.formula().unwrap().to_string(), "C34H53N7O15");
    }

    #[test]
    fn ranges_groups_and_unlocalized() {
        let setup = setup();
        let ranged = setup.create("PRT(ESFRMS)[+19.0523]ISK").unwrap();
        assert_eq!(ranged.ranged().len(), 1);
        assert_eq!((ranged.ranged()[0].start, ranged.ranged()[0].end), (3, 8));
        assert!((setup.shift("PRT(ESFRMS)[+19.0523]ISK", "PRTESFRMSISK") - 19.0523).abs() < 1e-6);

        let grouped = setup.create("EM[+15.995#g1]EVEM[#g1]K").unwrap();
        assert_eq!(grouped.grouped().len(), 1);
        assert_eq!(grouped.grouped()[0].candidates.len(), 2);
        assert!((setup.shift("EM[+15.995#g1]EVEM[#g1]K", "EMEVEMK") - 15.995).abs() < 1e-6);

        assert!((setup.shift("[+10]^2?PEPTIDE", "PEPTIDE") - 20.0).abs() < 1e-6);
    }

    #[test]
    fn formula_out_of_range() {
        let setup = setup();
        let group = setup.create("[Formula:C2]^2000000000?PEPTIDE").unwrap();
        assert_eq!(group.unlocalized()[0].1, 2_000_000_000);
        assert!(group.formula().is_none());
        assert!((setup.shift("[Formula:C2]^2000000000?PEPTIDE", "PEPTIDE") - 4.8e10).abs() < 1e-2);
        let within = setup.create("[Formula:C2]^1000000000?PEPTIDE").unwrap();
        assert_eq!(within.formula().unwrap().count("C"), 2_000_000_034);
    }

    #[test]
    fn labile_is_not_intact_mass() {
        let setup = setup();
        let group = setup.create("{Glycan:Hex}PEPTIDE").unwrap();
        assert_eq!(group.labile().len(), 1);
        assert!(setup.shift("{Glycan:Hex}PEPTIDE", "PEPTIDE").abs() < 1e-9);
    }

    #[test]
    fn global_modifications() {
        let setup = setup();
        let fixed = setup.create("<[+57.021464]@C>PEPCTCIDE").unwrap();
        assert_eq!(
            fixed.localized().iter().map(|(_, i)| *i).collect::<Vec<_>>(),
            vec![3, 5]
        );
        assert!(setup.create("<[+57.021464]@C>PEPC[+57.021464]IDE").is_ok());
        let error = setup.create("<[+57.021464]@C>PEPC[+1]IDE").unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Create);

        let labelled = setup.create("<13C>PEPTIDE").unwrap();
        assert_eq!(labelled.formula().unwrap().count("C"), 0);
        assert!((setup.shift("<13C>PEPTIDE", "PEPTIDE") - 34.0 * 1.003_354_837_8).abs() < 1e-6);
        assert!((setup.shift("<D>PEPTIDE", "PEPTIDE") - 53.0 * 1.006_276_746).abs() < 1e-5);
    }
}
