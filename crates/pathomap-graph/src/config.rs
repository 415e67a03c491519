//! Graph engine configuration.
//!
//! A `GraphConfig` is deserialized from TOML. Every field has a default, so an
//! empty document yields the stock thresholds and weights:
//!
//! ```toml
//! edge_threshold = 0.2
//! strong_threshold = 0.6
//! medium_threshold = 0.4
//!
//! [weights]
//! gram_status = 0.15
//! pathogen_type = 0.10
//! shared_conditions = 0.35
//! shared_antibiotics = 0.25
//! complexity = 0.10
//! resistance = 0.05
//!
//! [search]
//! max_depth = 6
//! max_expansions = 100000
//! ```
//!
//! Loading always validates; a config that parses but violates an invariant
//! is rejected with `PathomapError::ConfigError`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pathomap_contracts::error::{PathomapError, PathomapResult};

use crate::graph::EdgeTier;

/// Slack allowed when checking that the weights sum to at most 1.
const WEIGHT_SUM_EPSILON: f64 = 1e-9;

// ── Similarity weights ────────────────────────────────────────────────────────

/// Weight of each similarity factor. The weights must sum to at most 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimilarityWeights {
    /// Awarded when both pathogens share a known gram status.
    pub gram_status: f64,
    /// Awarded when both pathogens share an organism type.
    pub pathogen_type: f64,
    /// Scales the Jaccard ratio of condition sets.
    pub shared_conditions: f64,
    /// Scales the Jaccard ratio of co-occurring antibiotic sets.
    pub shared_antibiotics: f64,
    /// Scales the closeness of aggregate treatment complexity.
    pub complexity: f64,
    /// Reserved for resistance-pattern data. The factor itself is always 0.
    pub resistance: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            gram_status: 0.15,
            pathogen_type: 0.10,
            shared_conditions: 0.35,
            shared_antibiotics: 0.25,
            complexity: 0.10,
            resistance: 0.05,
        }
    }
}

impl SimilarityWeights {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("gram_status", self.gram_status),
            ("pathogen_type", self.pathogen_type),
            ("shared_conditions", self.shared_conditions),
            ("shared_antibiotics", self.shared_antibiotics),
            ("complexity", self.complexity),
            ("resistance", self.resistance),
        ]
    }

    pub fn total(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> PathomapResult<()> {
        for (name, weight) in self.named() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(PathomapError::ConfigError {
                    reason: format!("weight '{}' must be a non-negative number, got {}", name, weight),
                });
            }
        }
        let total = self.total();
        if total > 1.0 + WEIGHT_SUM_EPSILON {
            return Err(PathomapError::ConfigError {
                reason: format!("similarity weights sum to {:.4}, which exceeds 1.0", total),
            });
        }
        Ok(())
    }
}

// ── Search limits ─────────────────────────────────────────────────────────────

/// Bounds on exhaustive path enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchLimits {
    /// Largest hop count a caller may request.
    pub max_depth: usize,
    /// Largest number of neighbor expansions one search may perform.
    pub max_expansions: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_depth: 6,
            max_expansions: 100_000,
        }
    }
}

impl SearchLimits {
    pub fn validate(&self) -> PathomapResult<()> {
        if self.max_depth == 0 {
            return Err(PathomapError::ConfigError {
                reason: "search max_depth must be at least 1".to_string(),
            });
        }
        if self.max_expansions == 0 {
            return Err(PathomapError::ConfigError {
                reason: "search max_expansions must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// ── Graph config ──────────────────────────────────────────────────────────────

/// Thresholds, weights and search limits for graph construction and queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// An edge is materialized only when similarity is strictly above this.
    pub edge_threshold: f64,
    /// Edges strictly above this weight are `strong`.
    pub strong_threshold: f64,
    /// Edges strictly above this weight (and not strong) are `medium`.
    pub medium_threshold: f64,
    pub weights: SimilarityWeights,
    pub search: SearchLimits,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            edge_threshold: 0.2,
            strong_threshold: 0.6,
            medium_threshold: 0.4,
            weights: SimilarityWeights::default(),
            search: SearchLimits::default(),
        }
    }
}

impl GraphConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `PathomapError::ConfigError` if the TOML is malformed, names an
    /// unknown key, or breaks one of the threshold or weight invariants.
    pub fn from_toml_str(s: &str) -> PathomapResult<Self> {
        let config: GraphConfig = toml::from_str(s).map_err(|e| PathomapError::ConfigError {
            reason: format!("failed to parse graph config TOML: {}", e),
        })?;
        config.validate()?;
        debug!(
            edge_threshold = config.edge_threshold,
            strong_threshold = config.strong_threshold,
            medium_threshold = config.medium_threshold,
            max_depth = config.search.max_depth,
            "graph config loaded"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as graph configuration.
    pub fn from_file(path: &Path) -> PathomapResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PathomapError::ConfigError {
            reason: format!("failed to read graph config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> PathomapResult<()> {
        for (name, value) in [
            ("edge_threshold", self.edge_threshold),
            ("strong_threshold", self.strong_threshold),
            ("medium_threshold", self.medium_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PathomapError::ConfigError {
                    reason: format!("{} must be within [0, 1], got {}", name, value),
                });
            }
        }
        if self.medium_threshold > self.strong_threshold {
            return Err(PathomapError::ConfigError {
                reason: format!(
                    "medium_threshold ({}) must not exceed strong_threshold ({})",
                    self.medium_threshold, self.strong_threshold
                ),
            });
        }
        self.weights.validate()?;
        self.search.validate()
    }

    /// Tier for an edge of the given weight.
    pub fn tier_for(&self, weight: f64) -> EdgeTier {
        if weight > self.strong_threshold {
            EdgeTier::Strong
        } else if weight > self.medium_threshold {
            EdgeTier::Medium
        } else {
            EdgeTier::Weak
        }
    }
}
