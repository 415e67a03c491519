//! Error types for the pathomap pipeline.
//!
//! Parsing, indexing and graph queries never fail: unparseable text is
//! dropped and recorded as a diagnostic, missing lookups return empty
//! collections. `PathomapError` covers the few surfaces that can: loading
//! configuration or datasets, and the guarded path search.

use thiserror::Error;

/// The unified error type for the pathomap crates.
#[derive(Debug, Error)]
pub enum PathomapError {
    /// A configuration document is missing, malformed, or fails validation.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A condition dataset could not be read or is not a JSON array.
    #[error("dataset error: {reason}")]
    DatasetError { reason: String },

    /// The exhaustive path search hit its depth or expansion guard.
    #[error("path search limit exceeded: {reason}")]
    SearchLimitExceeded { reason: String },

    /// A caller required a pathogen that the current snapshot does not contain.
    ///
    /// Query functions return empty collections instead; this variant is only
    /// produced by lookups that need a concrete record to proceed.
    #[error("unknown pathogen '{name}'")]
    UnknownPathogen { name: String },
}

/// Convenience alias used throughout the pathomap crates.
pub type PathomapResult<T> = Result<T, PathomapError>;
