//! The `parse` command: run results + manifest in, JUnit XML out.
//!
//! Pipeline: validate custom properties, load and guard the run-results
//! document, load the manifest, index its test nodes, join results against
//! the index, serialize the report.

use crate::cli::ParseArgs;
use crate::error::{DbtJunitError, Result};
use crate::model::{Manifest, RunResults};
use crate::{properties, report, transform, util};
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the parse command.
///
/// # Errors
///
/// Returns an error on malformed custom properties, a missing or invalid
/// input document, a manifest test node with no source text, or a failed
/// output write. No partial output file is written on any of these.
pub fn execute(args: &ParseArgs) -> Result<()> {
    // Property specs are validated before any file is read.
    let spec = properties::parse_property_specs(&args.custom_properties)?;

    let run_results = load_run_results(&args.run_results)?;
    transform::validate_run_results(&run_results)?;
    let manifest = load_manifest(&args.manifest)?;

    let suite_timestamp = util::time::parse_dbt_timestamp(&run_results.metadata.generated_at)?;
    let index = transform::index_manifest(&manifest, spec.as_ref())?;
    let cases = transform::map_results(&run_results.results, suite_timestamp, &index)?;

    info!(
        cases = cases.len(),
        suite_timestamp = %util::time::format_report_timestamp(suite_timestamp),
        "mapped results to test cases"
    );

    let junit = report::build_report(cases, run_results.elapsed_time, suite_timestamp);
    report::write_report(&args.output, &junit)?;

    println!(
        "Wrote {} test case(s) to {}",
        run_results.results.len(),
        args.output.display()
    );
    Ok(())
}

fn load_run_results(path: &Path) -> Result<RunResults> {
    let raw = read_input(path)?;
    // A missing required key here is a document-shape problem, not a
    // serialization bug, so it surfaces as InvalidRunResult.
    serde_json::from_str(&raw).map_err(|err| DbtJunitError::InvalidRunResult {
        reason: format!("{}: {err}", path.display()),
    })
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let raw = read_input(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn read_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(DbtJunitError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(fs::read_to_string(path)?)
}
