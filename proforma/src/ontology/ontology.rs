use serde::{Deserialize, Serialize};

use crate::{helper_functions::strip_prefix_ignore_case, sequence::ProFormaEvidenceType};

/// All ontologies that can back an [`crate::ontology::OntologyLookup`]
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Ontology {
    /// Unimod
    #[default]
    Unimod,
    /// PSI-MOD
    Psimod,
    /// RESID
    Resid,
    /// The UniProt PTM list
    UniProt,
    /// XLMOD
    Xlmod,
}

impl Ontology {
    /// The evidence type that descriptors from this ontology carry
    pub const fn evidence_type(self) -> ProFormaEvidenceType {
        match self {
            Self::Unimod => ProFormaEvidenceType::Unimod,
            Self::Psimod => ProFormaEvidenceType::PsiMod,
            Self::Resid => ProFormaEvidenceType::Resid,
            Self::UniProt => ProFormaEvidenceType::UniProt,
            Self::Xlmod => ProFormaEvidenceType::XlMod,
        }
    }

    /// The prefix of accessions, eg `UNIMOD` in `UNIMOD:35`
    pub const fn accession_prefix(self) -> &'static str {
        match self {
            Self::Unimod => "UNIMOD",
            Self::Psimod => "MOD",
            Self::Resid => "RESID",
            Self::UniProt => "UniProt",
            Self::Xlmod => "XLMOD",
        }
    }

    /// The prefix that some ontologies put in front of the number, eg `AA` in `RESID:AA0037`
    pub const fn number_prefix(self) -> Option<&'static str> {
        match self {
            Self::Resid => Some("AA"),
            Self::UniProt => Some("PTM-"),
            Self::Unimod | Self::Psimod | Self::Xlmod => None,
        }
    }

    /// Parse the numeric id from an accession. Accepts the full accession (`UNIMOD:37`,
    /// `RESID:AA0037`), the accession without the ontology prefix (`AA0037`) or the bare
    /// number (`37`). The prefixes are case insensitive.
    /// ```rust
    /// use proforma::ontology::Ontology;
    /// assert_eq!(Ontology::Unimod.parse_accession("UNIMOD:37"), Some(37));
    /// assert_eq!(Ontology::Resid.parse_accession("resid:AA0037"), Some(37));
    /// assert_eq!(Ontology::Psimod.parse_accession("UNIMOD:37"), None);
    /// ```
    pub fn parse_accession(self, accession: &str) -> Option<u32> {
        let text = accession.trim();
        let text = strip_prefix_ignore_case(text, self.accession_prefix())
            .and_then(|t| t.strip_prefix(':'))
            .unwrap_or(text);
        let text = self
            .number_prefix()
            .and_then(|prefix| strip_prefix_ignore_case(text, prefix))
            .unwrap_or(text);
        if text.starts_with('+') {
            return None;
        }
        text.parse::<u32>().ok()
    }

    /// Format the accession for the given id, eg `RESID:AA0037`
    pub fn accession(self, id: u32) -> String {
        match self {
            Self::Unimod => format!("UNIMOD:{id}"),
            Self::Psimod => format!("MOD:{id:05}"),
            Self::Resid => format!("RESID:AA{id:04}"),
            Self::UniProt => format!("UniProt:PTM-{id:04}"),
            Self::Xlmod => format!("XLMOD:{id:05}"),
        }
    }
}

impl std::fmt::Display for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Unimod => "Unimod",
                Self::Psimod => "PSI-MOD",
                Self::Resid => "RESID",
                Self::UniProt => "UniProt",
                Self::Xlmod => "XLMOD",
            },
        )
    }
}

/// A single term as delivered by an ontology reader, the input for an [`crate::ontology::OntologyLookup`]
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct OntologyTerm {
    /// The identifier, either the plain number (`37`) or the accession (`UNIMOD:37`, `AA0037`)
    pub id: Box<str>,
    /// The name, eg `Trimethyl`
    pub name: Box<str>,
    /// The difference formula, in any dialect [`crate::chemistry::ChemicalFormula::parse`]
    /// understands, or None if the term has no mass information
    pub formula: Option<Box<str>>,
}

impl OntologyTerm {
    /// Create a new term
    pub fn new(
        id: impl Into<Box<str>>,
        name: impl Into<Box<str>>,
        formula: Option<impl Into<Box<str>>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            formula: formula.map(Into::into),
        }
    }
}
