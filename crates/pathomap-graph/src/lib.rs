//! # pathomap-graph
//!
//! Pathogen similarity scoring, the weighted relationship graph built from
//! it, simple-path enumeration, and study recommendations.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use pathomap_graph::{build_graph, find_paths, recommend, Preferences};
//!
//! let graph = build_graph(&indexes);
//! let paths = find_paths(&graph, "Staphylococcus aureus", "Escherichia coli", 4);
//! let next = recommend(&graph, "Staphylococcus aureus", &[], &Preferences::default());
//! ```
//!
//! All thresholds and weights live in [`GraphConfig`], loadable from TOML.

pub mod config;
pub mod graph;
pub mod paths;
pub mod recommend;
pub mod similarity;

pub use config::{GraphConfig, SearchLimits, SimilarityWeights};
pub use graph::{build_graph, build_graph_with, EdgeTier, GraphEdge, GraphNode, GraphStats, PathogenGraph};
pub use paths::{best_path, find_paths, rank_paths, try_find_paths, PathHop, PathResult, PathStrategy};
pub use recommend::{recommend, Preferences, Recommendation, RecommendationSource};
pub use similarity::{
    aggregate_complexity, similarity, similarity_with, SimilarityDetails, SimilarityFactors,
    SimilarityResult,
};

// ── Tests ─────────────────────────────────────────────────────────────────────
