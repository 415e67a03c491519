//! Exhaustive simple-path enumeration between two pathogens.
//!
//! The search is a depth-first walk with an explicit frame stack. Each frame
//! holds a cursor into the current node's adjacency list, so paths are
//! discovered in a deterministic order (edge order, depth first). Discovery
//! order is what stable re-ranking preserves for equal scores.
//!
//! The walk is bounded twice: by the caller's hop limit and by an expansion
//! budget from `SearchLimits`. Exceeding either is an error from
//! `try_find_paths` rather than a silently truncated result.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use pathomap_contracts::error::{PathomapError, PathomapResult};

use crate::config::SearchLimits;
use crate::graph::{EdgeTier, PathogenGraph};
use crate::similarity::SimilarityResult;

/// One hop along a path, oriented in travel direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathHop {
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub tier: EdgeTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Node names from start to end.
    pub nodes: Vec<String>,
    /// Arithmetic mean of the hop weights.
    pub score: f64,
    pub hops: usize,
    pub details: Vec<PathHop>,
}

/// Re-ranking applied on top of the score-sorted result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStrategy {
    /// Highest mean edge weight first.
    #[default]
    HighestScore,
    /// Fewest hops first.
    Shortest,
    /// Most hops first, visiting the most intermediate pathogens.
    MostDiverse,
}

// ── Search ────────────────────────────────────────────────────────────────────

fn path_result(graph: &PathogenGraph, start: &str, edge_path: &[usize]) -> PathResult {
    let mut nodes = vec![start.to_string()];
    let mut details = Vec::with_capacity(edge_path.len());
    let mut current = start;
    for &idx in edge_path {
        let edge = &graph.edges()[idx];
        let next = edge.other(current);
        details.push(PathHop {
            from: current.to_string(),
            to: next.to_string(),
            weight: edge.weight,
            tier: edge.tier,
            similarity: edge.similarity.clone(),
        });
        nodes.push(next.to_string());
        current = next;
    }
    let hops = details.len();
    let score = if hops == 0 {
        0.0
    } else {
        details.iter().map(|h| h.weight).sum::<f64>() / hops as f64
    };
    PathResult { nodes, score, hops, details }
}

/// Enumerate every simple path from `start` to `end` of at most `max_depth`
/// hops, sorted by descending score.
///
/// Returns an empty list when either endpoint is absent from the graph or
/// when `start == end`. Returns `PathomapError::SearchLimitExceeded` when
/// `max_depth` is above `limits.max_depth` or the walk expands more than
/// `limits.max_expansions` neighbors.
pub fn try_find_paths(
    graph: &PathogenGraph,
    start: &str,
    end: &str,
    max_depth: usize,
    limits: &SearchLimits,
) -> PathomapResult<Vec<PathResult>> {
    if max_depth > limits.max_depth {
        return Err(PathomapError::SearchLimitExceeded {
            reason: format!(
                "requested depth {} exceeds the configured maximum of {}",
                max_depth, limits.max_depth
            ),
        });
    }
    if start == end || !graph.contains(start) || !graph.contains(end) || max_depth == 0 {
        return Ok(Vec::new());
    }

    let mut found: Vec<Vec<usize>> = Vec::new();
    let mut nodes: Vec<&str> = vec![start];
    let mut on_path: HashSet<&str> = HashSet::from([start]);
    let mut edge_path: Vec<usize> = Vec::new();
    let mut cursors: Vec<usize> = vec![0];
    let mut expansions = 0usize;

    while let Some(&cursor) = cursors.last() {
        let current = nodes[nodes.len() - 1];
        let Some(&idx) = graph.adjacent_edges(current).get(cursor) else {
            // Frame exhausted; backtrack.
            cursors.pop();
            if let Some(left) = nodes.pop() {
                on_path.remove(left);
            }
            edge_path.pop();
            continue;
        };
        if let Some(c) = cursors.last_mut() {
            *c += 1;
        }

        let next = graph.edges()[idx].other(current);
        if on_path.contains(next) {
            continue;
        }
        expansions += 1;
        if expansions > limits.max_expansions {
            return Err(PathomapError::SearchLimitExceeded {
                reason: format!(
                    "path search from '{}' to '{}' exceeded {} expansions",
                    start, end, limits.max_expansions
                ),
            });
        }

        if next == end {
            let mut complete = edge_path.clone();
            complete.push(idx);
            found.push(complete);
            continue;
        }
        // `nodes.len()` is the hop count once `next` is appended.
        if nodes.len() < max_depth {
            nodes.push(next);
            on_path.insert(next);
            edge_path.push(idx);
            cursors.push(0);
        }
    }

    let mut paths: Vec<PathResult> = found
        .iter()
        .map(|edge_path| path_result(graph, start, edge_path))
        .collect();
    paths.sort_by(|a, b| b.score.total_cmp(&a.score));

    debug!(start, end, max_depth, expansions, paths = paths.len(), "path search finished");
    Ok(paths)
}

/// Enumerate paths with the default search limits.
///
/// A tripped guard is logged and yields an empty list.
pub fn find_paths(graph: &PathogenGraph, start: &str, end: &str, max_depth: usize) -> Vec<PathResult> {
    match try_find_paths(graph, start, end, max_depth, &SearchLimits::default()) {
        Ok(paths) => paths,
        Err(e) => {
            error!(start, end, max_depth, error = %e, "path search aborted");
            Vec::new()
        }
    }
}

// ── Ranking ───────────────────────────────────────────────────────────────────

/// Re-rank a score-sorted list. Every strategy is a stable sort, so paths
/// that tie keep their incoming order.
pub fn rank_paths(mut paths: Vec<PathResult>, strategy: PathStrategy) -> Vec<PathResult> {
    match strategy {
        PathStrategy::HighestScore => paths.sort_by(|a, b| b.score.total_cmp(&a.score)),
        PathStrategy::Shortest => paths.sort_by_key(|p| p.hops),
        PathStrategy::MostDiverse => paths.sort_by(|a, b| b.hops.cmp(&a.hops)),
    }
    paths
}

/// The head of the ranked path list, if any path exists.
pub fn best_path(
    graph: &PathogenGraph,
    start: &str,
    end: &str,
    max_depth: usize,
    strategy: PathStrategy,
) -> Option<PathResult> {
    rank_paths(find_paths(graph, start, end, max_depth), strategy)
        .into_iter()
        .next()
}
