//! Weighted multi-factor similarity between two pathogens.
//!
//! Every factor is symmetric in its two arguments and is computed into its
//! own field before the fixed-order sum, so `similarity(a, b)` and
//! `similarity(b, a)` produce bit-identical totals.

use std::collections::BTreeSet;

use serde::Serialize;

use pathomap_contracts::{
    entity::{GramStatus, PathogenRecord},
    index::Indexes,
};

use crate::config::SimilarityWeights;

/// Weighted contribution of each factor to the total.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityFactors {
    pub gram_status: f64,
    pub pathogen_type: f64,
    pub shared_conditions: f64,
    pub shared_antibiotics: f64,
    pub complexity: f64,
    /// Always 0 until resistance-pattern data exists.
    pub resistance: f64,
}

impl SimilarityFactors {
    fn sum(&self) -> f64 {
        self.gram_status
            + self.pathogen_type
            + self.shared_conditions
            + self.shared_antibiotics
            + self.complexity
            + self.resistance
    }
}

/// Human-readable overlap lists. Condition entries are display names.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityDetails {
    pub shared_conditions: Vec<String>,
    pub shared_antibiotics: Vec<String>,
    pub conditions_only_in_a: Vec<String>,
    pub conditions_only_in_b: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub pathogen_a: String,
    pub pathogen_b: String,
    /// In [0, 1]; exactly 1 for a pathogen compared with itself.
    pub total: f64,
    pub factors: SimilarityFactors,
    pub details: SimilarityDetails,
}

// ── Factor helpers ────────────────────────────────────────────────────────────

/// |a ∩ b| / |a ∪ b|, or 0 when both sets are empty.
fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Sum of complexity totals over every condition the pathogen appears on.
pub fn aggregate_complexity(record: &PathogenRecord, indexes: &Indexes) -> usize {
    record
        .conditions
        .iter()
        .filter_map(|id| indexes.condition_complexity.get(id))
        .map(|c| c.total)
        .sum()
}

/// 1 - |a - b| / max(a, b), floored at 0; 0 when both are 0.
fn closeness(a: usize, b: usize) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 0.0;
    }
    (1.0 - a.abs_diff(b) as f64 / max as f64).max(0.0)
}

fn condition_names<'a>(ids: impl Iterator<Item = &'a String>, indexes: &Indexes) -> Vec<String> {
    ids.map(|id| indexes.condition_name(id).to_string()).collect()
}

fn details_for(
    a: &PathogenRecord,
    b: &PathogenRecord,
    antibiotics_a: &BTreeSet<String>,
    antibiotics_b: &BTreeSet<String>,
    indexes: &Indexes,
) -> SimilarityDetails {
    SimilarityDetails {
        shared_conditions: condition_names(a.conditions.intersection(&b.conditions), indexes),
        shared_antibiotics: antibiotics_a.intersection(antibiotics_b).cloned().collect(),
        conditions_only_in_a: condition_names(a.conditions.difference(&b.conditions), indexes),
        conditions_only_in_b: condition_names(b.conditions.difference(&a.conditions), indexes),
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Similarity with the default weights.
pub fn similarity(a: &PathogenRecord, b: &PathogenRecord, indexes: &Indexes) -> SimilarityResult {
    similarity_with(a, b, indexes, &SimilarityWeights::default())
}

/// Similarity with caller-supplied weights.
pub fn similarity_with(
    a: &PathogenRecord,
    b: &PathogenRecord,
    indexes: &Indexes,
    weights: &SimilarityWeights,
) -> SimilarityResult {
    let empty = BTreeSet::new();
    let antibiotics_a = indexes.pathogen_antibiotic_matrix.get(&a.name).unwrap_or(&empty);
    let antibiotics_b = indexes.pathogen_antibiotic_matrix.get(&b.name).unwrap_or(&empty);
    let details = details_for(a, b, antibiotics_a, antibiotics_b, indexes);

    // Identical pathogens short-circuit; the factor breakdown stays zeroed.
    if a.name == b.name {
        return SimilarityResult {
            pathogen_a: a.name.clone(),
            pathogen_b: b.name.clone(),
            total: 1.0,
            factors: SimilarityFactors::default(),
            details,
        };
    }

    let gram_match = a.gram_status == b.gram_status && a.gram_status != GramStatus::Unknown;
    let factors = SimilarityFactors {
        gram_status: if gram_match { weights.gram_status } else { 0.0 },
        pathogen_type: if a.pathogen_type == b.pathogen_type {
            weights.pathogen_type
        } else {
            0.0
        },
        shared_conditions: jaccard(&a.conditions, &b.conditions) * weights.shared_conditions,
        shared_antibiotics: jaccard(antibiotics_a, antibiotics_b) * weights.shared_antibiotics,
        complexity: closeness(aggregate_complexity(a, indexes), aggregate_complexity(b, indexes))
            * weights.complexity,
        resistance: 0.0,
    };

    SimilarityResult {
        pathogen_a: a.name.clone(),
        pathogen_b: b.name.clone(),
        total: factors.sum().clamp(0.0, 1.0),
        factors,
        details,
    }
}
