use context_error::FullErrorContent;
use ordered_float::OrderedFloat;

use crate::{
    ProFormaErrorKind,
    sequence::{
        ProFormaAmbiguityAffix, ProFormaDescriptor, ProFormaEvidenceType, ProFormaKey,
        ProFormaMembershipDescriptor, ProFormaTag, ProFormaTerm,
    },
};

#[test]
fn plain_sequence() {
    let term = ProFormaTerm::parse("EMEVEESPEK").unwrap();
    assert_eq!(term.sequence(), "EMEVEESPEK");
    assert!(term.tags().is_empty());
    assert!(term.n_term().is_empty());
    assert!(term.c_term().is_empty());
    assert!(term.tag_groups().is_empty());
    assert!(term.unlocalized().is_empty());
    assert!(term.labile().is_empty());
    assert!(term.global_modifications().is_empty());
}

#[test]
fn localized_tags() {
    let term = ProFormaTerm::parse("EM[Oxidation]EVEES[Phospho]PEK").unwrap();
    assert_eq!(term.sequence(), "EMEVEESPEK");
    assert_eq!(
        term.tags(),
        [
            ProFormaTag::single(
                1,
                [ProFormaDescriptor::new(
                    ProFormaKey::Name,
                    ProFormaEvidenceType::None,
                    "Oxidation"
                )]
            ),
            ProFormaTag::single(
                6,
                [ProFormaDescriptor::new(
                    ProFormaKey::Name,
                    ProFormaEvidenceType::None,
                    "Phospho"
                )]
            ),
        ]
    );
}

#[test]
fn terminals() {
    let term = ProFormaTerm::parse("[Acetyl]-SEQUENCE").unwrap();
    assert_eq!(term.sequence(), "SEQUENCE");
    assert_eq!(term.n_term(), [ProFormaDescriptor::from_value("Acetyl")]);
    assert!(term.c_term().is_empty());

    let term = ProFormaTerm::parse("SEQUENCE-[Amidated|+1]").unwrap();
    assert_eq!(term.c_term().len(), 2);
    assert_eq!(term.c_term()[1].key(), ProFormaKey::Mass);
}

#[test]
fn ranges() {
    let term = ProFormaTerm::parse("PROT(EOSFORMS)[+19.0523]ISK").unwrap();
    assert_eq!(term.tags().len(), 1);
    let tag = &term.tags()[0];
    assert_eq!((tag.start(), tag.end()), (4, 11));
    assert!(tag.is_range());
    assert!(!tag.has_ambiguous_sequence());
    assert_eq!(tag.descriptors()[0].key(), ProFormaKey::Mass);
    assert_eq!(tag.descriptors()[0].value(), "+19.0523");

    let term = ProFormaTerm::parse("(?DQ)NGTWEM[Oxidation]K").unwrap();
    assert_eq!(term.tags().len(), 2);
    assert!(term.tags()[0].has_ambiguous_sequence());
    assert!(term.tags()[0].descriptors().is_empty());
    assert_eq!((term.tags()[0].start(), term.tags()[0].end()), (0, 1));
}

#[test]
fn sub_tags_in_range() {
    let term = ProFormaTerm::parse("EVE(S[Phospho]PE)[+1]K").unwrap();
    let spans: Vec<_> = term.tags().iter().map(|t| (t.start(), t.end())).collect();
    assert_eq!(spans, [(3, 5), (3, 3)]);
}

#[test]
fn unlocalized_and_labile() {
    let term = ProFormaTerm::parse("{Glycan:Hex}[Phospho]^2[Methyl]?PEPTIDE").unwrap();
    assert_eq!(term.labile().len(), 1);
    assert_eq!(term.labile()[0].key(), ProFormaKey::Glycan);
    assert_eq!(term.labile()[0].value(), "Hex");
    assert_eq!(term.unlocalized().len(), 2);
    assert_eq!(term.unlocalized()[0].count, 2);
    assert_eq!(term.unlocalized()[1].count, 1);
    assert!(term.tags().is_empty());
}

#[test]
fn global_modifications() {
    let term = ProFormaTerm::parse("<13C><[Carbamidomethyl]@C,M>PEPTCMK").unwrap();
    let globals = term.global_modifications();
    assert_eq!(globals.len(), 2);
    assert_eq!(globals[0].isotope_label(), Some("13C"));
    assert_eq!(globals[0].target_residues, None);
    assert_eq!(globals[1].isotope_label(), None);
    assert_eq!(
        globals[1].target_residues.as_deref(),
        Some(['C', 'M'].as_slice())
    );
    assert_eq!(globals[1].descriptors[0].value(), "Carbamidomethyl");
}

#[test]
fn tag_groups() {
    let term = ProFormaTerm::parse("EM[Oxidation#g1(0.9)]EVEM[#g1(0.1)]K[#g2]C[U:Phospho#g2]")
        .unwrap();
    assert!(term.tags().is_empty());
    let groups = term.tag_groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name(), "g1");
    assert_eq!(groups[0].value(), "Oxidation");
    assert_eq!(groups[0].key(), ProFormaKey::Name);
    assert_eq!(groups[0].preferred_location(), 0);
    assert_eq!(
        groups[0].memberships(),
        [
            ProFormaMembershipDescriptor {
                start: 1,
                end: 1,
                weight: OrderedFloat(0.9)
            },
            ProFormaMembershipDescriptor {
                start: 5,
                end: 5,
                weight: OrderedFloat(0.1)
            }
        ]
    );
    assert_eq!(groups[1].name(), "g2");
    assert_eq!(groups[1].evidence_type(), ProFormaEvidenceType::Unimod);
    assert_eq!(groups[1].preferred_location(), 1);
}

#[test]
fn descriptor_keys() {
    let term = ProFormaTerm::parse(
        "A[U:Oxidation]C[MOD:00046]D[Formula:C2H2O]E[Glycan:Hex]F[info:x]G[Obs:+1.0]H[RESID:AA0037]",
    )
    .unwrap();
    let keys: Vec<_> = term
        .tags()
        .iter()
        .map(|t| (t.descriptors()[0].key(), t.descriptors()[0].evidence_type()))
        .collect();
    assert_eq!(
        keys,
        [
            (ProFormaKey::Name, ProFormaEvidenceType::Unimod),
            (ProFormaKey::Identifier, ProFormaEvidenceType::PsiMod),
            (ProFormaKey::Formula, ProFormaEvidenceType::None),
            (ProFormaKey::Glycan, ProFormaEvidenceType::None),
            (ProFormaKey::Info, ProFormaEvidenceType::None),
            (ProFormaKey::Mass, ProFormaEvidenceType::Observed),
            (ProFormaKey::Identifier, ProFormaEvidenceType::Resid),
        ]
    );
    assert_eq!(term.tags()[1].descriptors()[0].value(), "MOD:00046");
}

#[test]
fn nested_brackets_and_escapes() {
    let term = ProFormaTerm::parse("EM[U:Cation:Fe[III]|info:a\\|b]K").unwrap();
    let descriptors = term.tags()[0].descriptors();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].value(), "Cation:Fe[III]");
    assert_eq!(descriptors[1].value(), "a|b");
}

#[test]
fn ambiguity_boundaries() {
    let term = ProFormaTerm::parse("PRT[g1->]ESFRMS[<-g1]ISK").unwrap();
    assert_eq!(
        term.tags()[0].descriptors()[0].affix(),
        Some(ProFormaAmbiguityAffix::LeftBoundary)
    );
    assert_eq!(
        term.tags()[1].descriptors()[0].affix(),
        Some(ProFormaAmbiguityAffix::RightBoundary)
    );
    assert_eq!(term.tags()[1].descriptors()[0].value(), "g1");
    assert_eq!(term.to_string(), "PRT[g1->]ESFRMS[<-g1]ISK");
}

#[test]
fn possible_sites_are_memberships() {
    let term = ProFormaTerm::parse("EM[+15.995#g1]EVEM[#g1]K").unwrap();
    assert!(
        term.tags()
            .iter()
            .flat_map(ProFormaTag::descriptors)
            .all(|d| d.affix().is_none())
    );
    assert_eq!(term.tag_groups()[0].memberships().len(), 2);
    assert_eq!(ProFormaTerm::parse(&term.to_string()).unwrap(), term);
}

#[test]
fn error_kinds() {
    for text in ["", "PEP[", "PEP[Cation:Fe]", "pep", "PE[#g1]P"] {
        let error = ProFormaTerm::parse(text).unwrap_err();
        assert_eq!(error.get_kind(), ProFormaErrorKind::Parse, "{text}");
    }
}

#[test]
fn serde_round_trip() {
    let term =
        ProFormaTerm::parse("<13C>{Glycan:Hex}[Acetyl]-EM[Oxidation#g1(0.5)]EVE(S[Phospho]PE)[+1]M[#g1]K-[Amidated]")
            .unwrap();
    let json = serde_json::to_string(&term).unwrap();
    let back: ProFormaTerm = serde_json::from_str(&json).unwrap();
    assert_eq!(term, back);
}

#[test]
fn serde_checks_term_rules() {
    let term = ProFormaTerm::parse("PEP[+1]TI(DE)[+2]").unwrap();
    let json = serde_json::to_value(&term).unwrap();

    let mut outside = json.clone();
    outside["tags"][0]["start"] = 9.into();
    outside["tags"][0]["end"] = 9.into();
    assert!(serde_json::from_value::<ProFormaTerm>(outside).is_err());

    let mut overlapping = json.clone();
    overlapping["tags"][0]["start"] = 2.into();
    overlapping["tags"][0]["end"] = 5.into();
    assert!(serde_json::from_value::<ProFormaTerm>(overlapping).is_err());

    let mut lowercase = json.clone();
    lowercase["sequence"] = "pepTIDE".into();
    assert!(serde_json::from_value::<ProFormaTerm>(lowercase).is_err());

    let mut reversed = json.clone();
    if let Some(tags) = reversed["tags"].as_array_mut() {
        tags.reverse();
    }
    let back: ProFormaTerm = serde_json::from_value(reversed).unwrap();
    assert_eq!(back, term);
    assert_eq!(back.to_string(), "PEP[+1]TI(DE)[+2]");
}
