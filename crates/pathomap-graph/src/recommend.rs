//! "What to look at next" recommendations.
//!
//! Candidates come from three ranked sources, consulted in order:
//!
//! 1. direct neighbors of the current pathogen, by edge weight (top 5);
//! 2. pathogens with the same gram status, by centrality (top 3, only when
//!    `systematic_learning` is set and the gram status is known);
//! 3. pathogens sharing conditions, by overlap ratio (top 3).
//!
//! A pathogen picked by an earlier source is never offered again by a later
//! one. Exclusions are applied before each source takes its top slice, so an
//! excluded candidate never costs a slot.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pathomap_contracts::entity::GramStatus;

use crate::graph::{GraphNode, PathogenGraph};

const DIRECT_LIMIT: usize = 5;
const SAME_GRAM_LIMIT: usize = 3;
const SHARED_CONDITION_LIMIT: usize = 3;
const TOTAL_LIMIT: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Also suggest pathogens of the same gram status.
    pub systematic_learning: bool,
    /// Allow recently viewed pathogens back into the results.
    pub include_recently_viewed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationSource {
    DirectConnection,
    SameGramStatus,
    SharedConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub pathogen: String,
    pub source: RecommendationSource,
    /// Edge weight, centrality or overlap ratio, depending on `source`.
    pub score: f64,
    pub reasoning: String,
}

fn by_score_desc(a: &(f64, &GraphNode), b: &(f64, &GraphNode)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name))
}

fn percent(value: f64) -> u32 {
    (value * 100.0).round() as u32
}

fn direct_reasoning(graph: &PathogenGraph, current: &str, candidate: &str, weight: f64) -> String {
    let shared = graph
        .edge_between(current, candidate)
        .and_then(|e| e.similarity.as_ref())
        .map(|s| s.details.shared_conditions.clone())
        .unwrap_or_default();
    if shared.is_empty() {
        format!("Directly connected to {} ({}% similar)", current, percent(weight))
    } else {
        format!(
            "Directly connected to {} ({}% similar); both appear in {}",
            current,
            percent(weight),
            shared.join(", ")
        )
    }
}

/// Recommend pathogens to study after `current`.
///
/// Returns an empty list when `current` is not in the graph.
pub fn recommend(
    graph: &PathogenGraph,
    current: &str,
    recently_viewed: &[String],
    preferences: &Preferences,
) -> Vec<Recommendation> {
    let Some(current_node) = graph.node(current) else {
        debug!(current, "recommendation target not in graph");
        return Vec::new();
    };

    let mut excluded: HashSet<&str> = HashSet::from([current]);
    if !preferences.include_recently_viewed {
        excluded.extend(recently_viewed.iter().map(String::as_str));
    }
    let mut picks: Vec<Recommendation> = Vec::new();

    // Direct neighbors.
    let mut direct: Vec<(f64, &GraphNode)> = graph
        .neighbors(current)
        .into_iter()
        .filter(|(name, _)| !excluded.contains(name))
        .filter_map(|(name, edge)| graph.node(name).map(|n| (edge.weight, n)))
        .collect();
    direct.sort_by(by_score_desc);
    for (weight, node) in direct.into_iter().take(DIRECT_LIMIT) {
        picks.push(Recommendation {
            pathogen: node.name.clone(),
            source: RecommendationSource::DirectConnection,
            score: weight,
            reasoning: direct_reasoning(graph, current, &node.name, weight),
        });
    }

    // Same gram status.
    if preferences.systematic_learning && current_node.gram_status != GramStatus::Unknown {
        let taken: HashSet<String> = picks.iter().map(|r| r.pathogen.clone()).collect();
        let mut same_gram: Vec<(f64, &GraphNode)> = graph
            .clusters()
            .get(&current_node.gram_status)
            .into_iter()
            .flatten()
            .filter(|name| !excluded.contains(name.as_str()) && !taken.contains(*name))
            .filter_map(|name| graph.node(name).map(|n| (n.centrality_score, n)))
            .collect();
        same_gram.sort_by(by_score_desc);
        for (centrality, node) in same_gram.into_iter().take(SAME_GRAM_LIMIT) {
            picks.push(Recommendation {
                pathogen: node.name.clone(),
                source: RecommendationSource::SameGramStatus,
                score: centrality,
                reasoning: format!(
                    "Same gram status ({}) as {}; {} connections in the graph",
                    current_node.gram_status, current, node.connections
                ),
            });
        }
    }

    // Shared conditions.
    let taken: HashSet<String> = picks.iter().map(|r| r.pathogen.clone()).collect();
    let mut sharing: Vec<(f64, &GraphNode)> = graph
        .nodes()
        .values()
        .filter(|n| !excluded.contains(n.name.as_str()) && !taken.contains(&n.name))
        .filter_map(|n| {
            let shared = current_node.conditions.intersection(&n.conditions).count();
            let denominator = current_node.conditions.len().max(n.conditions.len());
            (shared > 0 && denominator > 0).then(|| (shared as f64 / denominator as f64, n))
        })
        .collect();
    sharing.sort_by(by_score_desc);
    for (ratio, node) in sharing.into_iter().take(SHARED_CONDITION_LIMIT) {
        let shared: Vec<&str> = current_node
            .conditions
            .intersection(&node.conditions)
            .map(|id| graph.condition_name(id))
            .collect();
        picks.push(Recommendation {
            pathogen: node.name.clone(),
            source: RecommendationSource::SharedConditions,
            score: ratio,
            reasoning: format!(
                "Shares {} condition{} with {}: {}",
                shared.len(),
                if shared.len() == 1 { "" } else { "s" },
                current,
                shared.join(", ")
            ),
        });
    }

    picks.truncate(TOTAL_LIMIT);
    debug!(current, recommendations = picks.len(), "recommendations computed");
    picks
}
