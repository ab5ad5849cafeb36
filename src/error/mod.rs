//! Error types and handling for `dbt_junitxml`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Structural problems (bad schema version, malformed CLI input, missing
//!   manifest fields) are fatal and carry the offending key or literal text
//! - Per-record enrichment problems never surface here; they are recovered
//!   locally and logged where they occur

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `dbt_junitxml` operations.
#[derive(Error, Debug)]
pub enum DbtJunitError {
    // === Run-results document errors ===
    /// The run-results document is missing a required key, was produced by
    /// an unsupported dbt version, or is not the output of `dbt test`.
    #[error("Invalid run results: {reason}")]
    InvalidRunResult { reason: String },

    /// A timestamp in an input document does not match the dbt artifact
    /// format.
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    // === Manifest errors ===
    /// A manifest test node carries none of the recognized source-text
    /// fields.
    #[error(
        "Manifest node '{node}' has no source text \
         (expected one of compiled_sql, compiled_code, raw_code, raw_sql)"
    )]
    MissingSourceText { node: String },

    /// A test or result identifier does not have the expected
    /// `package.resource.name` dotted shape.
    #[error("Invalid test identifier '{id}': expected at least 3 dot-delimited segments")]
    InvalidTestId { id: String },

    // === CLI errors ===
    /// A `--custom-properties` item failed validation.
    #[error("Invalid custom property '{item}': {reason}")]
    MalformedPropertySpec { item: String, reason: String },

    /// An input document path does not exist.
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    // === I/O and serialization errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML report serialization error.
    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_junit::SerializeError),

    /// Wrapped anyhow error for context plumbing.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DbtJunitError {
    /// Can the user fix this without touching their dbt project?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedPropertySpec { .. }
                | Self::InputNotFound { .. }
                | Self::InvalidRunResult { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRunResult { .. } => {
                Some("Run 'dbt test' and point --run-results at target/run_results.json")
            }
            Self::MalformedPropertySpec { .. } => {
                Some("Properties must be key=value pairs with unique, non-empty keys")
            }
            Self::InputNotFound { .. } => {
                Some("Check the path, or run dbt first to generate the artifacts")
            }
            Self::MissingSourceText { .. } => {
                Some("Re-run 'dbt compile' so the manifest carries compiled SQL")
            }
            _ => None,
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type using `DbtJunitError`.
pub type Result<T> = std::result::Result<T, DbtJunitError>;
