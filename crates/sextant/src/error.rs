//! Error types for sextant operations.
//!
//! Failures split into two levels:
//!
//! - **`Error`**: fatal problems that stop the run (bad configuration,
//!   unreadable program input, graph store failures)
//! - **partial-analysis skips**: packages the front end could not type-check
//!   are counted in [`crate::AnalysisStats::packages_with_errors`] and
//!   reported, never raised as errors
//!
//! Store writes are idempotent keyed upserts, so there is no partial-commit
//! recovery path: a failed load is repaired by re-running the pipeline.

use thiserror::Error;

/// Result type for sextant operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for sextant operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Graph store operation failed
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Program input was malformed or structurally invalid
    #[error("program load error: {0}")]
    Program(#[from] sextant_ir::Error),

    /// Serializing analysis output failed
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}
