//! Typed views of the dbt artifact documents.
//!
//! This module defines the input-side data model:
//! - `RunResults` - the `run_results.json` document
//! - `ResultEntry` - one executed test result
//! - `TestStatus` - result outcome states
//! - `Manifest` / `ManifestNode` - the `manifest.json` document
//!
//! Both documents are parsed once at the boundary; nothing downstream
//! probes untyped JSON maps.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;

/// Deserialize a present key into `Some(value)`, so that `Option<Option<T>>`
/// fields can tell an absent key (`None`) from an explicit null
/// (`Some(None)`).
fn key_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Top-level `run_results.json` document.
#[derive(Debug, Clone, Deserialize)]
pub struct RunResults {
    pub metadata: RunMetadata,
    pub args: RunArgs,
    pub elapsed_time: f64,
    pub results: Vec<ResultEntry>,
}

/// The `metadata` block of a run-results document.
#[derive(Debug, Clone, Deserialize)]
pub struct RunMetadata {
    pub dbt_schema_version: String,
    pub generated_at: String,
}

/// The `args` block of a run-results document.
///
/// Newer artifacts record the executed subcommand under `which`; older
/// (RPC-era) documents use `rpc_method`. Both are optional here so the
/// guard can report the fallback chain itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunArgs {
    #[serde(default)]
    pub which: Option<String>,
    #[serde(default)]
    pub rpc_method: Option<String>,
}

impl RunArgs {
    /// The executed subcommand, preferring `which` over `rpc_method`.
    #[must_use]
    pub fn executed_command(&self) -> Option<&str> {
        self.which.as_deref().or(self.rpc_method.as_deref())
    }
}

/// One executed test result.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultEntry {
    pub unique_id: String,
    pub execution_time: f64,
    pub status: TestStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timing: Vec<TimingEvent>,
}

/// One timing event attached to a result.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingEvent {
    #[serde(default)]
    pub started_at: Option<String>,
}

/// Test result outcome.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
    Skipped,
    #[serde(untagged)]
    Other(String),
}

impl TestStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
            Self::Skipped => "skipped",
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top-level `manifest.json` document, reduced to its node collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub nodes: BTreeMap<String, ManifestNode>,
}

/// One manifest node. Only `resource_type == "test"` nodes participate in
/// the report.
///
/// The four source-text fields are generation-dependent: dbt renamed
/// `compiled_sql`/`raw_sql` to `compiled_code`/`raw_code` in manifest v5+.
/// Presence of the JSON key matters (an explicit `null` still counts as
/// present), hence the double-`Option` fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestNode {
    pub resource_type: String,
    #[serde(default)]
    pub original_file_path: String,
    #[serde(default)]
    pub schema: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "key_present")]
    pub compiled_sql: Option<Option<String>>,
    #[serde(default, deserialize_with = "key_present")]
    pub compiled_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "key_present")]
    pub raw_code: Option<Option<String>>,
    #[serde(default, deserialize_with = "key_present")]
    pub raw_sql: Option<Option<String>>,
}

impl ManifestNode {
    /// Resolve the node's source text across manifest generations.
    ///
    /// Checks `compiled_sql`, `compiled_code`, `raw_code`, `raw_sql` in that
    /// priority order; the first key present in the document wins even when
    /// its value is empty or null. Returns `None` when none of the four keys
    /// exist.
    #[must_use]
    pub fn source_text(&self) -> Option<&str> {
        [
            &self.compiled_sql,
            &self.compiled_code,
            &self.raw_code,
            &self.raw_sql,
        ]
        .into_iter()
        .find_map(|field| {
            field
                .as_ref()
                .map(|value| value.as_deref().unwrap_or_default())
        })
    }

    /// The relation to query for failures: alias when set and non-empty,
    /// otherwise the node name.
    #[must_use]
    pub fn relation_name(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.name)
    }
}
