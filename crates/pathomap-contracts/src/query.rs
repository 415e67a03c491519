//! Plain option records accepted by the query surface.

use serde::{Deserialize, Serialize};

use crate::entity::{GramStatus, PathogenType};

/// Ordering applied to pathogen search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathogenSort {
    #[default]
    Name,
    /// Most conditions first.
    ConditionCount,
    /// Exact name match, then prefix, then substring; ties by condition count.
    Relevance,
}

/// Filters for `search_pathogens`. The default matches every pathogen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathogenQuery {
    /// Case-insensitive substring over name, short name and details.
    pub query: Option<String>,
    pub gram_status: Option<GramStatus>,
    pub pathogen_type: Option<PathogenType>,
    pub min_conditions: usize,
    pub sort_by: PathogenSort,
}

impl PathogenQuery {
    pub fn matching(text: impl Into<String>) -> Self {
        Self {
            query: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Ordering applied to antibiotic search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AntibioticSort {
    #[default]
    Name,
    ConditionCount,
    /// Grouped by drug class, then by name.
    DrugClass,
    /// Broadest reference-table coverage first.
    SpectrumBreadth,
}

/// Filters for `search_antibiotics`. The default matches every antibiotic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AntibioticQuery {
    pub query: Option<String>,
    /// Exact drug class label, compared case-insensitively.
    pub drug_class: Option<String>,
    pub min_conditions: usize,
    pub sort_by: AntibioticSort,
}

impl AntibioticQuery {
    pub fn matching(text: impl Into<String>) -> Self {
        Self {
            query: Some(text.into()),
            ..Self::default()
        }
    }
}
