//! Convert dbt test run artifacts into JUnit XML reports.
//!
//! Reads `run_results.json` and `manifest.json`, joins result entries to
//! their manifest test definitions by canonical name, enriches each case
//! with compiled query text and optional classification properties, and
//! writes a JUnit XML document for CI dashboards.
//!
//! The pipeline is a single-pass, stateless transform:
//! guard ([`transform::validate_run_results`]) → index
//! ([`transform::index_manifest`]) → join ([`transform::map_results`]) →
//! serialize ([`report`]).

pub mod cli;
pub mod error;
pub mod logging;
pub mod model;
pub mod properties;
pub mod report;
pub mod transform;
pub mod util;

pub use error::{DbtJunitError, Result};
