use std::fmt::{Display, Write};

use serde::{Deserialize, Serialize};

use crate::helper_functions::{escape, is_signed_number};

/// The kind of information a descriptor holds
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ProFormaKey {
    /// No key, used for ambiguity descriptors and isotope labels
    #[default]
    None,
    /// A known modification name, eg `Oxidation` or `U:Oxidation`
    Name,
    /// A mass shift, eg `+15.995` or `Obs:+15.995`
    Mass,
    /// A chemical formula, eg `Formula:C2H2O`
    Formula,
    /// Free text information without chemistry, eg `info:oxidised`
    Info,
    /// An ontology accession, eg `UNIMOD:35` or `MOD:00046`
    Identifier,
    /// A glycan composition, eg `Glycan:Hex2HexNAc`
    Glycan,
}

/// The source that backs up a descriptor
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ProFormaEvidenceType {
    /// No specific source
    #[default]
    None,
    /// An experimentally observed value
    Observed,
    /// Unimod
    Unimod,
    /// The UniProt PTM list
    UniProt,
    /// RESID
    Resid,
    /// PSI-MOD
    PsiMod,
    /// The BRNO histone nomenclature
    Brno,
    /// XL-MOD
    XlMod,
    /// GNOme
    Gno,
}

impl ProFormaEvidenceType {
    /// The prefix used for names with this evidence, eg `U` for Unimod
    pub const fn name_prefix(self) -> Option<&'static str> {
        match self {
            Self::Unimod => Some("U"),
            Self::PsiMod => Some("M"),
            Self::Resid => Some("R"),
            Self::XlMod => Some("X"),
            Self::Gno => Some("G"),
            Self::Brno => Some("B"),
            Self::Observed => Some("Obs"),
            Self::UniProt => Some("UniProt"),
            Self::None => None,
        }
    }

    /// The prefix used for accessions with this evidence, eg `UNIMOD` for Unimod
    pub const fn accession_prefix(self) -> Option<&'static str> {
        match self {
            Self::Unimod => Some("UNIMOD"),
            Self::PsiMod => Some("MOD"),
            Self::Resid => Some("RESID"),
            Self::XlMod => Some("XLMOD"),
            Self::Gno => Some("GNO"),
            Self::UniProt => Some("UniProt"),
            Self::Brno | Self::Observed | Self::None => None,
        }
    }
}

/// The affix of an ambiguity descriptor, which defines how the group name is written. A
/// possible site (`#name`) is not an affix, it is stored as a membership of a [`crate::sequence::ProFormaTagGroup`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ProFormaAmbiguityAffix {
    /// The left boundary of an ambiguous region, written as `name->`
    LeftBoundary,
    /// The right boundary of an ambiguous region, written as `<-name`
    RightBoundary,
}

/// A single annotation inside a tag, eg `U:Oxidation` in `M[U:Oxidation|info:found]`
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProFormaDescriptor {
    key: ProFormaKey,
    evidence_type: ProFormaEvidenceType,
    value: String,
    affix: Option<ProFormaAmbiguityAffix>,
}

impl ProFormaDescriptor {
    /// Create a new descriptor
    pub fn new(
        key: ProFormaKey,
        evidence_type: ProFormaEvidenceType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key,
            evidence_type,
            value: value.into(),
            affix: None,
        }
    }

    /// Create a descriptor for a bare value, a signed number is a mass while anything else is a modification name
    pub fn from_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let key = if is_signed_number(&value) {
            ProFormaKey::Mass
        } else {
            ProFormaKey::Name
        };
        Self::new(key, ProFormaEvidenceType::None, value)
    }

    /// Create an ambiguity descriptor for the given group
    pub fn ambiguity(affix: ProFormaAmbiguityAffix, group: impl Into<String>) -> Self {
        Self {
            key: ProFormaKey::None,
            evidence_type: ProFormaEvidenceType::None,
            value: group.into(),
            affix: Some(affix),
        }
    }

    /// Create a descriptor from the key token (the text before the first colon) and its value.
    /// The token is case insensitive. Returns None if the token is not a known key.
    /// ```rust
    /// use proforma::sequence::*;
    /// let descriptor = ProFormaDescriptor::from_token("U", "+15.995").unwrap();
    /// assert_eq!(descriptor.key(), ProFormaKey::Mass);
    /// assert_eq!(descriptor.evidence_type(), ProFormaEvidenceType::Unimod);
    /// assert!(ProFormaDescriptor::from_token("Unknown", "x").is_none());
    /// ```
    pub fn from_token(token: &str, value: &str) -> Option<Self> {
        use ProFormaEvidenceType as E;
        use ProFormaKey as K;
        let (key, evidence_type) = match token.to_ascii_lowercase().as_str() {
            "u" => (K::Name, E::Unimod),
            "m" => (K::Name, E::PsiMod),
            "r" => (K::Name, E::Resid),
            "x" => (K::Name, E::XlMod),
            "g" => (K::Name, E::Gno),
            "b" => (K::Name, E::Brno),
            "unimod" => (K::Identifier, E::Unimod),
            "mod" => (K::Identifier, E::PsiMod),
            "resid" => (K::Identifier, E::Resid),
            "xlmod" => (K::Identifier, E::XlMod),
            "gno" => (K::Identifier, E::Gno),
            "uniprot" => (K::Identifier, E::UniProt),
            "obs" => (K::Mass, E::Observed),
            "formula" => (K::Formula, E::None),
            "glycan" => (K::Glycan, E::None),
            "info" => (K::Info, E::None),
            _ => return None,
        };
        let value = if key == K::Identifier {
            format!("{token}:{value}")
        } else {
            value.to_string()
        };
        let key = if key == K::Name && is_signed_number(&value) {
            K::Mass
        } else {
            key
        };
        Some(Self::new(key, evidence_type, value))
    }

    /// The key
    pub const fn key(&self) -> ProFormaKey {
        self.key
    }

    /// The evidence type
    pub const fn evidence_type(&self) -> ProFormaEvidenceType {
        self.evidence_type
    }

    /// The value, for ambiguity descriptors this is the group name
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The ambiguity affix, if this is an ambiguity descriptor
    pub const fn affix(&self) -> Option<ProFormaAmbiguityAffix> {
        self.affix
    }

    /// The accession as written, a bare identifier (`37`) gets the prefix of its ontology (`UNIMOD:37`)
    fn accession(&self) -> String {
        match self.evidence_type.accession_prefix() {
            Some(prefix) if !self.value.contains(':') => format!("{prefix}:{}", self.value),
            _ => self.value.clone(),
        }
    }

    pub(super) fn display(&self, f: &mut impl Write) -> std::fmt::Result {
        if let Some(affix) = self.affix {
            return match affix {
                ProFormaAmbiguityAffix::LeftBoundary => write!(f, "{}->", self.value),
                ProFormaAmbiguityAffix::RightBoundary => write!(f, "<-{}", self.value),
            };
        }
        let value = escape(&self.value, '|');
        match self.key {
            ProFormaKey::None => write!(f, "{value}"),
            ProFormaKey::Name | ProFormaKey::Mass => match self.evidence_type.name_prefix() {
                Some(prefix) => write!(f, "{prefix}:{value}"),
                None => write!(f, "{value}"),
            },
            ProFormaKey::Identifier => write!(f, "{}", escape(&self.accession(), '|')),
            ProFormaKey::Formula => write!(f, "Formula:{value}"),
            ProFormaKey::Glycan => write!(f, "Glycan:{value}"),
            ProFormaKey::Info => write!(f, "info:{value}"),
        }
    }
}

impl Display for ProFormaDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.display(f)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn tokens() {
        let name = ProFormaDescriptor::from_token("u", "Oxidation").unwrap();
        assert_eq!(name.key(), ProFormaKey::Name);
        assert_eq!(name.evidence_type(), ProFormaEvidenceType::Unimod);
        assert_eq!(name.to_string(), "U:Oxidation");

        let id = ProFormaDescriptor::from_token("UNIMOD", "35").unwrap();
        assert_eq!(id.key(), ProFormaKey::Identifier);
        assert_eq!(id.value(), "UNIMOD:35");
        assert_eq!(id.to_string(), "UNIMOD:35");

        let observed = ProFormaDescriptor::from_token("Obs", "+15.995").unwrap();
        assert_eq!(observed.key(), ProFormaKey::Mass);
        assert_eq!(observed.to_string(), "Obs:+15.995");

        let info = ProFormaDescriptor::from_token("INFO", "a|b").unwrap();
        assert_eq!(info.key(), ProFormaKey::Info);
        assert_eq!(info.to_string(), "info:a\\|b");

        assert!(ProFormaDescriptor::from_token("Cation", "Fe[III]").is_none());
    }

    #[test]
    fn bare_values() {
        assert_eq!(ProFormaDescriptor::from_value("+79.966").key(), ProFormaKey::Mass);
        assert_eq!(ProFormaDescriptor::from_value("Phospho").key(), ProFormaKey::Name);
        assert_eq!(
            ProFormaDescriptor::new(ProFormaKey::Identifier, ProFormaEvidenceType::Unimod, "37")
                .to_string(),
            "UNIMOD:37"
        );
    }

    #[test]
    fn ambiguity() {
        use ProFormaAmbiguityAffix as A;
        assert_eq!(ProFormaDescriptor::ambiguity(A::LeftBoundary, "g1").to_string(), "g1->");
        assert_eq!(ProFormaDescriptor::ambiguity(A::RightBoundary, "g1").to_string(), "<-g1");
    }
}
