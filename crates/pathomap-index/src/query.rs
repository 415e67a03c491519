//! Read-only query surface over built indexes.
//!
//! Every function takes the indexes by reference plus plain options and
//! returns an owned or borrowed collection. Unknown names produce empty
//! collections, never errors.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use pathomap_contracts::{
    entity::{AntibioticRecord, GramStatus, PathogenRecord},
    index::Indexes,
    query::{AntibioticQuery, AntibioticSort, PathogenQuery, PathogenSort},
};
use pathomap_parser::spectrum_table;

// ── Name resolution ───────────────────────────────────────────────────────────

/// Find a pathogen by canonical name, falling back to a case-insensitive match.
pub fn find_pathogen<'a>(indexes: &'a Indexes, name: &str) -> Option<&'a PathogenRecord> {
    let name = name.trim();
    indexes.pathogen(name).or_else(|| {
        indexes
            .pathogens
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    })
}

/// Find an antibiotic by canonical name, falling back to a case-insensitive match.
pub fn find_antibiotic<'a>(indexes: &'a Indexes, name: &str) -> Option<&'a AntibioticRecord> {
    let name = name.trim();
    indexes.antibiotic(name).or_else(|| {
        indexes
            .antibiotics
            .values()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    })
}

// ── Search ────────────────────────────────────────────────────────────────────

/// How closely a pathogen matches a lowercase query; lower is better.
fn pathogen_relevance(record: &PathogenRecord, needle: &str) -> u8 {
    let name = record.name.to_lowercase();
    if name == needle {
        0
    } else if name.starts_with(needle) {
        1
    } else if name.contains(needle) {
        2
    } else {
        3
    }
}

fn pathogen_matches_text(record: &PathogenRecord, needle: &str) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.short_name.to_lowercase().contains(needle)
        || record
            .details
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

/// Filter and sort pathogens.
pub fn search_pathogens<'a>(indexes: &'a Indexes, query: &PathogenQuery) -> Vec<&'a PathogenRecord> {
    let needle = query
        .query
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut hits: Vec<&PathogenRecord> = indexes
        .pathogens
        .values()
        .filter(|p| query.gram_status.map_or(true, |g| p.gram_status == g))
        .filter(|p| query.pathogen_type.map_or(true, |t| p.pathogen_type == t))
        .filter(|p| p.conditions.len() >= query.min_conditions)
        .filter(|p| needle.as_deref().map_or(true, |n| pathogen_matches_text(p, n)))
        .collect();

    match query.sort_by {
        PathogenSort::Name => hits.sort_by(|a, b| a.name.cmp(&b.name)),
        PathogenSort::ConditionCount => hits.sort_by(|a, b| {
            b.conditions
                .len()
                .cmp(&a.conditions.len())
                .then_with(|| a.name.cmp(&b.name))
        }),
        PathogenSort::Relevance => {
            let needle = needle.unwrap_or_default();
            hits.sort_by(|a, b| {
                pathogen_relevance(a, &needle)
                    .cmp(&pathogen_relevance(b, &needle))
                    .then_with(|| b.conditions.len().cmp(&a.conditions.len()))
                    .then_with(|| a.name.cmp(&b.name))
            })
        }
    }
    hits
}

fn spectrum_breadth(record: &AntibioticRecord) -> f64 {
    spectrum_table()
        .coverage_breadth(&record.drug_class)
        .unwrap_or(0.0)
}

/// Filter and sort antibiotics.
pub fn search_antibiotics<'a>(indexes: &'a Indexes, query: &AntibioticQuery) -> Vec<&'a AntibioticRecord> {
    let needle = query
        .query
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    let mut hits: Vec<&AntibioticRecord> = indexes
        .antibiotics
        .values()
        .filter(|a| {
            query
                .drug_class
                .as_deref()
                .map_or(true, |c| a.drug_class.eq_ignore_ascii_case(c.trim()))
        })
        .filter(|a| a.conditions.len() >= query.min_conditions)
        .filter(|a| {
            needle.as_deref().map_or(true, |n| {
                a.name.to_lowercase().contains(n) || a.drug_class.to_lowercase().contains(n)
            })
        })
        .collect();

    match query.sort_by {
        AntibioticSort::Name => hits.sort_by(|a, b| a.name.cmp(&b.name)),
        AntibioticSort::ConditionCount => hits.sort_by(|a, b| {
            b.conditions
                .len()
                .cmp(&a.conditions.len())
                .then_with(|| a.name.cmp(&b.name))
        }),
        AntibioticSort::DrugClass => hits.sort_by(|a, b| {
            a.drug_class
                .cmp(&b.drug_class)
                .then_with(|| a.name.cmp(&b.name))
        }),
        AntibioticSort::SpectrumBreadth => hits.sort_by(|a, b| {
            spectrum_breadth(b)
                .total_cmp(&spectrum_breadth(a))
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
    hits
}

// ── Cross-references ──────────────────────────────────────────────────────────

/// Condition ids that mention the pathogen.
pub fn get_conditions_for_pathogen(indexes: &Indexes, name: &str) -> Vec<String> {
    find_pathogen(indexes, name)
        .and_then(|p| indexes.pathogen_to_conditions.get(&p.name))
        .map(|ids| ids.iter().cloned().collect())
        .unwrap_or_default()
}

/// Condition ids whose therapy lists the antibiotic.
pub fn get_conditions_for_antibiotic(indexes: &Indexes, name: &str) -> Vec<String> {
    find_antibiotic(indexes, name)
        .and_then(|a| indexes.antibiotic_to_conditions.get(&a.name))
        .map(|ids| ids.iter().cloned().collect())
        .unwrap_or_default()
}

/// Antibiotics co-occurring with the pathogen on any condition.
pub fn get_antibiotics_for_pathogen(indexes: &Indexes, name: &str) -> Vec<String> {
    find_pathogen(indexes, name)
        .and_then(|p| indexes.pathogen_antibiotic_matrix.get(&p.name))
        .map(|names| names.iter().cloned().collect())
        .unwrap_or_default()
}

/// Pathogens whose conditions list the antibiotic.
pub fn get_pathogens_for_antibiotic(indexes: &Indexes, name: &str) -> Vec<String> {
    let Some(antibiotic) = find_antibiotic(indexes, name) else {
        return Vec::new();
    };
    indexes
        .pathogen_antibiotic_matrix
        .iter()
        .filter(|(_, drugs)| drugs.contains(&antibiotic.name))
        .map(|(pathogen, _)| pathogen.clone())
        .collect()
}

/// Antibiotics in a drug class, compared case-insensitively.
pub fn get_antibiotics_in_class(indexes: &Indexes, drug_class: &str) -> Vec<String> {
    indexes
        .drug_class_to_antibiotics
        .iter()
        .find(|(class, _)| class.eq_ignore_ascii_case(drug_class.trim()))
        .map(|(_, names)| names.iter().cloned().collect())
        .unwrap_or_default()
}

/// Condition ids in a category, compared case-insensitively.
pub fn get_conditions_in_category(indexes: &Indexes, category: &str) -> Vec<String> {
    indexes
        .category_to_conditions
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(category.trim()))
        .map(|(_, ids)| ids.iter().cloned().collect())
        .unwrap_or_default()
}

// ── Statistics ────────────────────────────────────────────────────────────────

/// Summary counts over a built index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStatistics {
    pub condition_count: usize,
    pub pathogen_count: usize,
    pub antibiotic_count: usize,
    pub drug_class_count: usize,
    /// Total pathogen–condition links.
    pub pathogen_condition_links: usize,
    pub skipped_fragments: usize,
    pub gram_distribution: BTreeMap<GramStatus, usize>,
    pub class_distribution: BTreeMap<String, usize>,
    /// Pathogen referenced by the most conditions, with its count.
    pub most_referenced_pathogen: Option<(String, usize)>,
    /// Condition with the highest complexity total, with that total.
    pub most_complex_condition: Option<(String, usize)>,
}

fn max_by_count<'a>(items: impl Iterator<Item = (&'a String, usize)>) -> Option<(String, usize)> {
    items
        .max_by(|(a_name, a), (b_name, b)| match a.cmp(b) {
            // Ties resolve to the alphabetically first name.
            Ordering::Equal => b_name.cmp(a_name),
            other => other,
        })
        .map(|(name, count)| (name.clone(), count))
}

pub fn index_statistics(indexes: &Indexes) -> IndexStatistics {
    let mut gram_distribution = BTreeMap::new();
    for record in indexes.pathogens.values() {
        *gram_distribution.entry(record.gram_status).or_insert(0) += 1;
    }

    let class_distribution = indexes
        .drug_class_to_antibiotics
        .iter()
        .map(|(class, names)| (class.clone(), names.len()))
        .collect();

    IndexStatistics {
        condition_count: indexes.condition_count(),
        pathogen_count: indexes.pathogens.len(),
        antibiotic_count: indexes.antibiotics.len(),
        drug_class_count: indexes.drug_class_to_antibiotics.len(),
        pathogen_condition_links: indexes.pathogen_to_conditions.values().map(|s| s.len()).sum(),
        skipped_fragments: indexes.diagnostics.len(),
        gram_distribution,
        class_distribution,
        most_referenced_pathogen: max_by_count(
            indexes
                .pathogen_to_conditions
                .iter()
                .map(|(name, ids)| (name, ids.len())),
        ),
        most_complex_condition: max_by_count(
            indexes
                .condition_complexity
                .iter()
                .map(|(id, c)| (id, c.total)),
        ),
    }
}
