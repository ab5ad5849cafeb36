//! The join-and-enrichment transform.
//!
//! Pipeline: [`validate_run_results`] guards the document, [`index_manifest`]
//! builds the canonical-name lookup table, [`map_results`] joins executed
//! results against it and produces normalized [`ReportCase`] records for the
//! report builder.

use crate::error::{DbtJunitError, Result};
use crate::model::{Manifest, ManifestNode, ResultEntry, RunResults, TestStatus};
use crate::properties::{DerivedProperties, PropertySpec, derive_properties};
use crate::util::time::parse_dbt_timestamp;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Exact `dbt_schema_version` values this tool understands.
pub const SUPPORTED_SCHEMA_VERSIONS: [&str; 3] = [
    "https://schemas.getdbt.com/dbt/run-results/v4.json",
    "https://schemas.getdbt.com/dbt/run-results/v5.json",
    "https://schemas.getdbt.com/dbt/run-results/v6.json",
];

/// Sentinel emitted as a case's stdout when no manifest entry matched.
const NO_SOURCE_SENTINEL: &str = "N/A";

/// Width of the rule wrapping the `select * from ...` query in a case's
/// source log block.
const QUERY_RULE_WIDTH: usize = 96;

/// Validate the run-results document before any mapping proceeds.
///
/// Checks, in document order: the schema version is one of
/// [`SUPPORTED_SCHEMA_VERSIONS`] (exact string match), then the executed
/// subcommand (`args.which`, falling back to `args.rpc_method`) equals
/// `"test"`.
///
/// # Errors
///
/// Returns [`DbtJunitError::InvalidRunResult`] naming the offending field on
/// the first rule that fails.
pub fn validate_run_results(run: &RunResults) -> Result<()> {
    let version = run.metadata.dbt_schema_version.as_str();
    if !SUPPORTED_SCHEMA_VERSIONS.contains(&version) {
        return Err(DbtJunitError::InvalidRunResult {
            reason: format!(
                "unsupported dbt_schema_version '{version}' (only run-results v4-v6 are supported)"
            ),
        });
    }

    let command = run
        .args
        .executed_command()
        .ok_or_else(|| DbtJunitError::InvalidRunResult {
            reason: "args has neither 'which' nor 'rpc_method'".to_string(),
        })?;
    if command != "test" {
        return Err(DbtJunitError::InvalidRunResult {
            reason: format!("document must be the output of 'dbt test', got 'dbt {command}'"),
        });
    }
    Ok(())
}

/// Extract the canonical test name: the 3rd dot-delimited segment of a
/// compound identifier such as `test.my_project.not_null_orders_id.c3a9db`.
///
/// # Errors
///
/// Returns [`DbtJunitError::InvalidTestId`] when the identifier has fewer
/// than 3 segments. There is no fallback shape.
pub fn canonical_test_name(unique_id: &str) -> Result<&str> {
    unique_id
        .split('.')
        .nth(2)
        .ok_or_else(|| DbtJunitError::InvalidTestId {
            id: unique_id.to_string(),
        })
}

/// One manifest test node, enriched for lookup by the mapper.
#[derive(Debug, Clone)]
pub struct IndexedTest {
    /// Formatted query log block followed by the node's resolved source text.
    pub sql: String,
    /// Derived classification tags, when a [`PropertySpec`] was supplied.
    pub properties: Option<DerivedProperties>,
}

/// Build the canonical-name lookup table from the manifest's test nodes.
///
/// Only nodes with `resource_type == "test"` participate. Name collisions
/// keep the entry whose node key sorts last and are logged.
///
/// # Errors
///
/// Returns [`DbtJunitError::InvalidTestId`] when a test node's key is not a
/// 3+ segment dotted identifier, or [`DbtJunitError::MissingSourceText`]
/// when a test node carries none of the recognized source-text fields.
/// Either aborts the whole indexing pass.
pub fn index_manifest(
    manifest: &Manifest,
    spec: Option<&PropertySpec>,
) -> Result<BTreeMap<String, IndexedTest>> {
    let mut index = BTreeMap::new();
    for (key, node) in &manifest.nodes {
        if node.resource_type != "test" {
            continue;
        }
        let test_name = canonical_test_name(key)?;
        let source_text = node
            .source_text()
            .ok_or_else(|| DbtJunitError::MissingSourceText { node: key.clone() })?;
        let sql = format!("{}{source_text}", query_log_block(node));
        let properties = spec.map(|spec| derive_properties(&node.original_file_path, spec));

        if index
            .insert(test_name.to_string(), IndexedTest { sql, properties })
            .is_some()
        {
            warn!(
                test_name,
                node = key.as_str(),
                "duplicate canonical test name in manifest, keeping the later node"
            );
        }
    }
    debug!(tests = index.len(), "indexed manifest test nodes");
    Ok(index)
}

/// The `select * from {schema}.{relation}` query wrapped in separator rules,
/// emitted above a case's source text so failures can be reproduced by hand.
fn query_log_block(node: &ManifestNode) -> String {
    let rule = "-".repeat(QUERY_RULE_WIDTH);
    let query = format!("select * from {}.{}", node.schema, node.relation_name());
    format!("\n{rule}\n{query}\n{rule}")
}

/// A normalized, output-bound test case.
#[derive(Debug, Clone)]
pub struct ReportCase {
    /// The result's full compound identifier.
    pub classname: String,
    /// Canonical test name.
    pub name: String,
    pub elapsed_sec: f64,
    pub status: TestStatus,
    /// Diagnostic text for non-passing outcomes.
    pub message: Option<String>,
    pub timestamp: NaiveDateTime,
    /// Query log block plus source text, or the `"N/A"` sentinel when no
    /// manifest entry matched.
    pub stdout: String,
    pub properties: Option<DerivedProperties>,
}

/// Join executed results against the indexed manifest.
///
/// Output order preserves input order. An unmatched result degrades to the
/// `"N/A"` sentinel with no properties; it never fails the run. A passing
/// result is stamped with its first timing event's `started_at`; any other
/// status (or a missing/unparseable timing event) falls back to the
/// suite-level timestamp.
///
/// # Errors
///
/// Returns [`DbtJunitError::InvalidTestId`] when a result's `unique_id` is
/// not a 3+ segment dotted identifier.
pub fn map_results(
    results: &[ResultEntry],
    suite_timestamp: NaiveDateTime,
    index: &BTreeMap<String, IndexedTest>,
) -> Result<Vec<ReportCase>> {
    results
        .iter()
        .map(|result| map_result(result, suite_timestamp, index))
        .collect()
}

fn map_result(
    result: &ResultEntry,
    suite_timestamp: NaiveDateTime,
    index: &BTreeMap<String, IndexedTest>,
) -> Result<ReportCase> {
    let name = canonical_test_name(&result.unique_id)?;
    let matched = index.get(name);
    if matched.is_none() {
        debug!(
            unique_id = result.unique_id.as_str(),
            "no manifest entry for result, degrading to sentinel"
        );
    }

    Ok(ReportCase {
        classname: result.unique_id.clone(),
        name: name.to_string(),
        elapsed_sec: result.execution_time,
        status: result.status.clone(),
        message: result.message.clone(),
        timestamp: case_timestamp(result, suite_timestamp),
        stdout: matched.map_or_else(|| NO_SOURCE_SENTINEL.to_string(), |entry| entry.sql.clone()),
        properties: matched.and_then(|entry| entry.properties.clone()),
    })
}

/// A passing case gets its own start time; everything else shares the
/// suite-level timestamp.
fn case_timestamp(result: &ResultEntry, suite_timestamp: NaiveDateTime) -> NaiveDateTime {
    if result.status != TestStatus::Pass {
        return suite_timestamp;
    }
    let Some(started_at) = result
        .timing
        .first()
        .and_then(|event| event.started_at.as_deref())
    else {
        return suite_timestamp;
    };
    match parse_dbt_timestamp(started_at) {
        Ok(timestamp) => timestamp,
        Err(err) => {
            warn!(
                unique_id = result.unique_id.as_str(),
                %err,
                "unparseable timing event, falling back to suite timestamp"
            );
            suite_timestamp
        }
    }
}
