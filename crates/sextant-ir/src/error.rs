//! Error types for program construction and decoding.

use thiserror::Error;

/// Result type for IR operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or decoding a [`crate::Program`].
///
/// Every variant is a structural defect in the input: the front end produced
/// a reference to something it never declared, or declared the same package
/// twice. A program that passes validation is safe to index by id without
/// further bounds checks.
#[derive(Debug, Error)]
pub enum Error {
    /// Two packages were declared with the same import path.
    #[error("duplicate package import path `{0}`")]
    DuplicatePackage(String),

    /// An id referenced an arena slot that was never declared.
    #[error("{context}: dangling {kind} id {index}")]
    DanglingId {
        /// Where the bad reference was found (function or type name).
        context: String,
        /// Arena the id points into.
        kind: &'static str,
        /// The out-of-range index.
        index: usize,
    },

    /// A body instruction referenced a local slot beyond the declared count.
    #[error("function `{func}`: local {local} out of range ({locals} slots declared)")]
    LocalOutOfRange {
        /// Function whose body is malformed.
        func: String,
        /// The offending local index.
        local: u32,
        /// Number of slots the body declared.
        locals: u32,
    },

    /// A function declares fewer local slots than its parameter count.
    #[error("function `{func}`: {params} parameters but only {locals} local slots")]
    TooFewLocals {
        /// Function whose body is malformed.
        func: String,
        /// Parameter count (including the receiver for methods).
        params: usize,
        /// Number of slots the body declared.
        locals: u32,
    },

    /// The JSON input could not be decoded into a program.
    #[error("program decode error: {0}")]
    Json(#[from] serde_json::Error),
}
