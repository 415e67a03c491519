//! The derived index structures produced by the index builder.
//!
//! `Indexes` is rebuilt wholesale from a condition snapshot and never mutated
//! in place. All maps are ordered so two builds over equal input compare
//! equal, but callers must not rely on iteration order for meaning.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::entity::{AntibioticRecord, PathogenRecord};

/// Per-condition treatment complexity counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionComplexity {
    pub pathogen_count: usize,
    pub antibiotic_count: usize,
    /// Number of therapy contexts listed on the condition.
    pub therapy_option_count: usize,
    /// Sum of the three counts above.
    pub total: usize,
}

impl ConditionComplexity {
    pub fn new(pathogen_count: usize, antibiotic_count: usize, therapy_option_count: usize) -> Self {
        Self {
            pathogen_count,
            antibiotic_count,
            therapy_option_count,
            total: pathogen_count + antibiotic_count + therapy_option_count,
        }
    }
}

/// Canonical entity lists plus every reverse lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indexes {
    pub pathogens: BTreeMap<String, PathogenRecord>,
    pub antibiotics: BTreeMap<String, AntibioticRecord>,
    /// Condition id to display name.
    pub condition_names: BTreeMap<String, String>,
    pub pathogen_to_conditions: BTreeMap<String, BTreeSet<String>>,
    pub antibiotic_to_conditions: BTreeMap<String, BTreeSet<String>>,
    pub condition_to_pathogens: BTreeMap<String, BTreeSet<String>>,
    pub condition_to_antibiotics: BTreeMap<String, BTreeSet<String>>,
    pub drug_class_to_antibiotics: BTreeMap<String, BTreeSet<String>>,
    pub antibiotic_to_drug_class: BTreeMap<String, String>,
    /// Pathogen to every antibiotic that appears on any condition the pathogen
    /// appears on. A co-occurrence, not an effectiveness claim.
    pub pathogen_antibiotic_matrix: BTreeMap<String, BTreeSet<String>>,
    pub condition_complexity: BTreeMap<String, ConditionComplexity>,
    pub category_to_conditions: BTreeMap<String, BTreeSet<String>>,
    /// Fragments dropped during extraction.
    pub diagnostics: Diagnostics,
}

impl Indexes {
    pub fn pathogen(&self, name: &str) -> Option<&PathogenRecord> {
        self.pathogens.get(name)
    }

    pub fn antibiotic(&self, name: &str) -> Option<&AntibioticRecord> {
        self.antibiotics.get(name)
    }

    /// Display name for a condition id, falling back to the id itself.
    pub fn condition_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.condition_names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn condition_count(&self) -> usize {
        self.condition_names.len()
    }
}
