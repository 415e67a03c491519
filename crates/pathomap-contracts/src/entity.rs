//! Typed pathogen and antibiotic records produced by the entity parser.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gram-stain classification derived from genus-name pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GramStatus {
    Positive,
    Negative,
    Atypical,
    AcidFast,
    Unknown,
}

impl GramStatus {
    pub const ALL: [GramStatus; 5] = [
        GramStatus::Positive,
        GramStatus::Negative,
        GramStatus::Atypical,
        GramStatus::AcidFast,
        GramStatus::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GramStatus::Positive => "positive",
            GramStatus::Negative => "negative",
            GramStatus::Atypical => "atypical",
            GramStatus::AcidFast => "acid-fast",
            GramStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GramStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        GramStatus::ALL
            .into_iter()
            .find(|g| g.label() == wanted)
            .ok_or_else(|| format!("unknown gram status '{s}'"))
    }
}

/// Broad organism type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathogenType {
    #[serde(rename = "bacteria")]
    Bacteria,
    #[serde(rename = "virus")]
    Virus,
    #[serde(rename = "fungus")]
    Fungus,
    #[serde(rename = "mycobacteria")]
    Mycobacteria,
    #[serde(rename = "atypical bacteria")]
    AtypicalBacteria,
}

impl PathogenType {
    pub const ALL: [PathogenType; 5] = [
        PathogenType::Bacteria,
        PathogenType::Virus,
        PathogenType::Fungus,
        PathogenType::Mycobacteria,
        PathogenType::AtypicalBacteria,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PathogenType::Bacteria => "bacteria",
            PathogenType::Virus => "virus",
            PathogenType::Fungus => "fungus",
            PathogenType::Mycobacteria => "mycobacteria",
            PathogenType::AtypicalBacteria => "atypical bacteria",
        }
    }
}

impl fmt::Display for PathogenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PathogenType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        PathogenType::ALL
            .into_iter()
            .find(|t| t.label() == wanted)
            .ok_or_else(|| format!("unknown pathogen type '{s}'"))
    }
}

/// Whether an organism is covered by typical empiric regimens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectrumCategory {
    Typical,
    Atypical,
}

/// A normalized pathogen entity.
///
/// `name` is the canonical key: unique within one built index. Mentions that
/// normalize to the same name share a single record whose `conditions` is the
/// union of every mention's conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathogenRecord {
    /// Canonical name, e.g. "Staphylococcus aureus".
    pub name: String,
    /// The name as it was first written, before abbreviation expansion.
    pub short_name: String,
    /// Parenthetical qualifier such as "MRSA". When mentions with different
    /// qualifiers merge, each distinct one is kept in first-seen order,
    /// joined by ", ".
    pub details: Option<String>,
    pub gram_status: GramStatus,
    #[serde(rename = "type")]
    pub pathogen_type: PathogenType,
    pub spectrum_category: SpectrumCategory,
    /// Ids of the conditions that mention this pathogen.
    pub conditions: BTreeSet<String>,
}

/// A normalized antibiotic entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntibioticRecord {
    /// Canonical name, e.g. "Ampicillin/sulbactam".
    pub name: String,
    /// Drug class from the spectrum reference table, or "Other".
    #[serde(rename = "class")]
    pub drug_class: String,
    pub conditions: BTreeSet<String>,
    /// Therapy-context labels this drug appeared under, first-seen order.
    pub therapy_contexts: Vec<String>,
}

/// Drug class assigned when the reference table has no match.
pub const DEFAULT_DRUG_CLASS: &str = "Other";
