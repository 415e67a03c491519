//! The pathogen relationship graph.
//!
//! A `PathogenGraph` is assembled once, either from built indexes
//! (`build_graph`) or from pre-computed parts (`PathogenGraph::from_parts`),
//! and never mutated afterwards. Both paths share one finalization step that
//! drops invalid edges and then derives adjacency, degree, centrality and the
//! gram-status clusters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pathomap_contracts::{
    entity::{GramStatus, PathogenRecord, PathogenType},
    index::Indexes,
};

use crate::config::GraphConfig;
use crate::similarity::{similarity_with, SimilarityResult};

// ── Edge tier ─────────────────────────────────────────────────────────────────

/// Coarse strength band of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeTier {
    Strong,
    Medium,
    Weak,
}

impl EdgeTier {
    pub fn label(self) -> &'static str {
        match self {
            EdgeTier::Strong => "strong",
            EdgeTier::Medium => "medium",
            EdgeTier::Weak => "weak",
        }
    }

    /// Contribution of one edge of this tier to a node's centrality numerator.
    pub fn centrality_weight(self) -> f64 {
        match self {
            EdgeTier::Strong => 3.0,
            EdgeTier::Medium => 2.0,
            EdgeTier::Weak => 1.0,
        }
    }
}

impl fmt::Display for EdgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Nodes and edges ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub name: String,
    pub gram_status: GramStatus,
    pub pathogen_type: PathogenType,
    /// Condition ids the pathogen appears on.
    pub conditions: BTreeSet<String>,
    /// Degree. Derived during finalization.
    pub connections: usize,
    /// (3·strong + 2·medium + 1·weak) / node count. Derived during finalization.
    pub centrality_score: f64,
}

impl GraphNode {
    pub fn new(name: impl Into<String>, gram_status: GramStatus, pathogen_type: PathogenType) -> Self {
        Self {
            name: name.into(),
            gram_status,
            pathogen_type,
            conditions: BTreeSet::new(),
            connections: 0,
            centrality_score: 0.0,
        }
    }

    pub fn with_conditions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions.extend(ids.into_iter().map(Into::into));
        self
    }

    fn from_record(record: &PathogenRecord) -> Self {
        Self {
            conditions: record.conditions.clone(),
            ..Self::new(record.name.clone(), record.gram_status, record.pathogen_type)
        }
    }
}

/// An undirected weighted edge. `source` and `target` carry no direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub tier: EdgeTier,
    /// The full breakdown when the edge came from a similarity computation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<SimilarityResult>,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, weight: f64, tier: EdgeTier) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
            tier,
            similarity: None,
        }
    }

    /// The endpoint opposite `name`.
    pub fn other(&self, name: &str) -> &str {
        if self.source == name {
            &self.target
        } else {
            &self.source
        }
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Summary counts over a built graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub tier_counts: BTreeMap<EdgeTier, usize>,
    pub average_degree: f64,
    /// Edge count over the number of possible pairs.
    pub density: f64,
    pub isolated_nodes: usize,
    pub most_central: Option<(String, f64)>,
    pub cluster_sizes: BTreeMap<GramStatus, usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathogenGraph {
    nodes: BTreeMap<String, GraphNode>,
    edges: Vec<GraphEdge>,
    /// Node name to indices into `edges`, in edge order.
    #[serde(skip)]
    adjacency: BTreeMap<String, Vec<usize>>,
    clusters: BTreeMap<GramStatus, BTreeSet<String>>,
    /// Condition id to display name, for reasoning strings.
    #[serde(skip)]
    condition_names: BTreeMap<String, String>,
}

impl PathogenGraph {
    /// Assemble a graph from pre-computed nodes and edges.
    ///
    /// Duplicate node names keep the first node. Self-loops, edges naming an
    /// unknown node, and repeated pairs are dropped with a warning. Degree and
    /// centrality on the supplied nodes are recomputed.
    pub fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self::finalize(nodes, edges, BTreeMap::new())
    }

    fn finalize(
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        condition_names: BTreeMap<String, String>,
    ) -> Self {
        let mut node_map: BTreeMap<String, GraphNode> = BTreeMap::new();
        for node in nodes {
            if node_map.contains_key(&node.name) {
                warn!(node = %node.name, "duplicate graph node ignored");
                continue;
            }
            node_map.insert(node.name.clone(), node);
        }

        let mut kept: Vec<GraphEdge> = Vec::with_capacity(edges.len());
        let mut seen_pairs: BTreeSet<(String, String)> = BTreeSet::new();
        for edge in edges {
            if edge.source == edge.target {
                warn!(node = %edge.source, "self-loop edge dropped");
                continue;
            }
            if !node_map.contains_key(&edge.source) || !node_map.contains_key(&edge.target) {
                warn!(
                    source = %edge.source,
                    target = %edge.target,
                    "edge references an unknown node; dropped"
                );
                continue;
            }
            let pair = if edge.source < edge.target {
                (edge.source.clone(), edge.target.clone())
            } else {
                (edge.target.clone(), edge.source.clone())
            };
            if !seen_pairs.insert(pair) {
                warn!(source = %edge.source, target = %edge.target, "duplicate edge dropped");
                continue;
            }
            kept.push(edge);
        }

        let mut adjacency: BTreeMap<String, Vec<usize>> =
            node_map.keys().map(|name| (name.clone(), Vec::new())).collect();
        let mut centrality_sums: BTreeMap<&str, f64> = BTreeMap::new();
        for (idx, edge) in kept.iter().enumerate() {
            for endpoint in [&edge.source, &edge.target] {
                adjacency.entry(endpoint.clone()).or_default().push(idx);
                *centrality_sums.entry(endpoint.as_str()).or_insert(0.0) +=
                    edge.tier.centrality_weight();
            }
        }

        let node_count = node_map.len() as f64;
        for (name, node) in node_map.iter_mut() {
            node.connections = adjacency.get(name).map_or(0, Vec::len);
            node.centrality_score =
                centrality_sums.get(name.as_str()).copied().unwrap_or(0.0) / node_count;
        }

        let mut clusters: BTreeMap<GramStatus, BTreeSet<String>> = BTreeMap::new();
        for node in node_map.values() {
            clusters
                .entry(node.gram_status)
                .or_default()
                .insert(node.name.clone());
        }

        Self {
            nodes: node_map,
            edges: kept,
            adjacency,
            clusters,
            condition_names,
        }
    }

    pub fn nodes(&self) -> &BTreeMap<String, GraphNode> {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Nodes grouped by gram status.
    pub fn clusters(&self) -> &BTreeMap<GramStatus, BTreeSet<String>> {
        &self.clusters
    }

    /// Indices into `edges()` touching `name`, in edge order.
    pub(crate) fn adjacent_edges(&self, name: &str) -> &[usize] {
        self.adjacency.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbor names paired with the connecting edge, in edge order.
    pub fn neighbors(&self, name: &str) -> Vec<(&str, &GraphEdge)> {
        self.adjacent_edges(name)
            .iter()
            .map(|&idx| {
                let edge = &self.edges[idx];
                (edge.other(name), edge)
            })
            .collect()
    }

    pub fn edge_between(&self, a: &str, b: &str) -> Option<&GraphEdge> {
        self.adjacent_edges(a)
            .iter()
            .map(|&idx| &self.edges[idx])
            .find(|edge| edge.connects(a, b))
    }

    /// Display name for a condition id, falling back to the id itself.
    pub fn condition_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.condition_names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn stats(&self) -> GraphStats {
        let node_count = self.nodes.len();
        let edge_count = self.edges.len();

        let mut tier_counts = BTreeMap::new();
        for edge in &self.edges {
            *tier_counts.entry(edge.tier).or_insert(0) += 1;
        }

        let possible_pairs = node_count * node_count.saturating_sub(1) / 2;
        let most_central = self
            .nodes
            .values()
            .fold(None::<&GraphNode>, |best, node| match best {
                Some(b) if b.centrality_score >= node.centrality_score => Some(b),
                _ => Some(node),
            })
            .map(|n| (n.name.clone(), n.centrality_score));

        GraphStats {
            node_count,
            edge_count,
            tier_counts,
            average_degree: if node_count == 0 {
                0.0
            } else {
                2.0 * edge_count as f64 / node_count as f64
            },
            density: if possible_pairs == 0 {
                0.0
            } else {
                edge_count as f64 / possible_pairs as f64
            },
            isolated_nodes: self.nodes.values().filter(|n| n.connections == 0).count(),
            most_central,
            cluster_sizes: self
                .clusters
                .iter()
                .map(|(gram, names)| (*gram, names.len()))
                .collect(),
        }
    }
}

// ── Construction from indexes ─────────────────────────────────────────────────

/// Build the graph with the default configuration.
pub fn build_graph(indexes: &Indexes) -> PathogenGraph {
    build_graph_with(indexes, &GraphConfig::default())
}

/// Build the graph: one node per pathogen, one edge per pair whose
/// similarity is strictly above `config.edge_threshold`.
pub fn build_graph_with(indexes: &Indexes, config: &GraphConfig) -> PathogenGraph {
    let records: Vec<&PathogenRecord> = indexes.pathogens.values().collect();
    let nodes: Vec<GraphNode> = records.iter().map(|r| GraphNode::from_record(r)).collect();

    let mut edges = Vec::new();
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            let result = similarity_with(a, b, indexes, &config.weights);
            if result.total <= config.edge_threshold {
                continue;
            }
            let tier = config.tier_for(result.total);
            debug!(
                source = %a.name,
                target = %b.name,
                weight = result.total,
                %tier,
                "edge materialized"
            );
            edges.push(GraphEdge {
                source: a.name.clone(),
                target: b.name.clone(),
                weight: result.total,
                tier,
                similarity: Some(result),
            });
        }
    }

    let graph = PathogenGraph::finalize(nodes, edges, indexes.condition_names.clone());
    let stats = graph.stats();
    info!(
        nodes = stats.node_count,
        edges = stats.edge_count,
        strong = stats.tier_counts.get(&EdgeTier::Strong).copied().unwrap_or(0),
        medium = stats.tier_counts.get(&EdgeTier::Medium).copied().unwrap_or(0),
        weak = stats.tier_counts.get(&EdgeTier::Weak).copied().unwrap_or(0),
        isolated = stats.isolated_nodes,
        "pathogen graph built"
    );
    graph
}
