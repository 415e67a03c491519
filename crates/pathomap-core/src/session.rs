//! Exploration sessions over an immutable snapshot.
//!
//! A `Snapshot` is the (fingerprint, indexes, graph) triple built from one
//! dataset. An `ExplorerSession` holds the current snapshot behind an `Arc`:
//! readers clone the `Arc` and keep a consistent view while a refresh swaps
//! in a new snapshot. A refresh with an unchanged dataset reuses the existing
//! snapshot.

use std::sync::Arc;

use tracing::{debug, info};

use pathomap_contracts::{
    condition::Condition,
    entity::{AntibioticRecord, PathogenRecord},
    error::{PathomapError, PathomapResult},
    index::Indexes,
    query::{AntibioticQuery, PathogenQuery},
};
use pathomap_graph::{
    build_graph_with, rank_paths, recommend, similarity_with, try_find_paths, GraphConfig,
    PathResult, PathStrategy, PathogenGraph, Preferences, Recommendation, SimilarityResult,
};
use pathomap_index::{build_indexes, find_pathogen, index_statistics, IndexStatistics};
use pathomap_parser::parse_pathogen_mention;

use crate::fingerprint::fingerprint;

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Everything derived from one dataset. Never mutated after `build`.
#[derive(Debug)]
pub struct Snapshot {
    fingerprint: String,
    indexes: Indexes,
    graph: PathogenGraph,
}

impl Snapshot {
    pub fn build(conditions: &[Condition], config: &GraphConfig) -> Self {
        let fingerprint = fingerprint(conditions);
        let indexes = build_indexes(conditions);
        let graph = build_graph_with(&indexes, config);
        info!(
            fingerprint = %fingerprint,
            pathogens = indexes.pathogens.len(),
            edges = graph.edges().len(),
            "snapshot built"
        );
        Self { fingerprint, indexes, graph }
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn indexes(&self) -> &Indexes {
        &self.indexes
    }

    pub fn graph(&self) -> &PathogenGraph {
        &self.graph
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// The query entry point for a front end.
///
/// Names passed to the path, recommendation and similarity helpers are
/// resolved to canonical pathogen names first: exact or case-insensitive
/// matches, then abbreviations such as "E. coli" through the mention parser.
#[derive(Debug)]
pub struct ExplorerSession {
    snapshot: Arc<Snapshot>,
    config: GraphConfig,
}

impl ExplorerSession {
    pub fn new(conditions: &[Condition], config: GraphConfig) -> Self {
        let snapshot = Arc::new(Snapshot::build(conditions, &config));
        Self { snapshot, config }
    }

    /// A shared handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn indexes(&self) -> &Indexes {
        self.snapshot.indexes()
    }

    pub fn graph(&self) -> &PathogenGraph {
        self.snapshot.graph()
    }

    /// Rebuild from `conditions` unless they fingerprint the same as the
    /// current snapshot. Returns `true` when a new snapshot was built.
    pub fn refresh(&mut self, conditions: &[Condition]) -> bool {
        let incoming = fingerprint(conditions);
        if incoming == self.snapshot.fingerprint() {
            debug!(fingerprint = %incoming, "dataset unchanged; snapshot reused");
            return false;
        }
        info!(
            previous = %self.snapshot.fingerprint(),
            current = %incoming,
            "dataset changed; rebuilding snapshot"
        );
        self.snapshot = Arc::new(Snapshot::build(conditions, &self.config));
        true
    }

    /// Look up a pathogen by canonical name or by any written form the
    /// mention parser normalizes to one.
    pub fn resolve_pathogen(&self, name: &str) -> Option<&PathogenRecord> {
        let indexes = self.indexes();
        find_pathogen(indexes, name).or_else(|| {
            parse_pathogen_mention(name).and_then(|parsed| find_pathogen(indexes, &parsed.name))
        })
    }

    /// Canonical name for `name`, or the trimmed input when nothing matches.
    fn canonical_name(&self, name: &str) -> String {
        self.resolve_pathogen(name)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| name.trim().to_string())
    }

    pub fn search_pathogens(&self, query: &PathogenQuery) -> Vec<&PathogenRecord> {
        pathomap_index::search_pathogens(self.indexes(), query)
    }

    pub fn search_antibiotics(&self, query: &AntibioticQuery) -> Vec<&AntibioticRecord> {
        pathomap_index::search_antibiotics(self.indexes(), query)
    }

    pub fn statistics(&self) -> IndexStatistics {
        index_statistics(self.indexes())
    }

    /// Paths between two pathogens under the configured search limits.
    pub fn find_paths(&self, start: &str, end: &str, max_depth: usize) -> PathomapResult<Vec<PathResult>> {
        let start = self.canonical_name(start);
        let end = self.canonical_name(end);
        try_find_paths(self.graph(), &start, &end, max_depth, &self.config.search)
    }

    /// Paths re-ranked by `strategy`.
    pub fn ranked_paths(
        &self,
        start: &str,
        end: &str,
        max_depth: usize,
        strategy: PathStrategy,
    ) -> PathomapResult<Vec<PathResult>> {
        Ok(rank_paths(self.find_paths(start, end, max_depth)?, strategy))
    }

    pub fn recommend(
        &self,
        current: &str,
        recently_viewed: &[String],
        preferences: &Preferences,
    ) -> Vec<Recommendation> {
        let current = self.canonical_name(current);
        let recent: Vec<String> = recently_viewed.iter().map(|n| self.canonical_name(n)).collect();
        recommend(self.graph(), &current, &recent, preferences)
    }

    /// Similarity between two named pathogens with the configured weights.
    ///
    /// Returns `PathomapError::UnknownPathogen` if either name is not in the
    /// current snapshot.
    pub fn similarity_by_name(&self, a: &str, b: &str) -> PathomapResult<SimilarityResult> {
        let lookup = |name: &str| {
            self.resolve_pathogen(name)
                .ok_or_else(|| PathomapError::UnknownPathogen { name: name.trim().to_string() })
        };
        let first = lookup(a)?;
        let second = lookup(b)?;
        Ok(similarity_with(first, second, self.indexes(), &self.config.weights))
    }
}
