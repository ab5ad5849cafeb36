//! JUnit XML report assembly.
//!
//! Thin layer over `quick-junit`: normalized [`ReportCase`] records go in,
//! one serialized `<testsuites>` document comes out. The whole document is
//! rendered in memory before the output file is created, so a fatal error
//! never leaves a partial report behind.

use crate::error::Result;
use crate::transform::ReportCase;
use chrono::NaiveDateTime;
use quick_junit::{NonSuccessKind, Property, Report, TestCase, TestCaseStatus, TestSuite};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Name of the single suite carrying all test cases.
const SUITE_NAME: &str = "Tests";

/// Assemble the JUnit report from normalized cases.
#[must_use]
pub fn build_report(
    cases: Vec<ReportCase>,
    elapsed_time: f64,
    suite_timestamp: NaiveDateTime,
) -> Report {
    let mut suite = TestSuite::new(SUITE_NAME);
    suite.set_timestamp(suite_timestamp.and_utc().fixed_offset());
    suite.time = Some(seconds(elapsed_time));
    for case in cases {
        suite.add_test_case(build_test_case(case));
    }

    let mut report = Report::new("dbt-junitxml");
    report.set_timestamp(suite_timestamp.and_utc().fixed_offset());
    report.set_time(seconds(elapsed_time));
    report.add_test_suite(suite);
    report
}

/// Render the report and write it to `path`.
///
/// # Errors
///
/// Returns an error when XML serialization or the file write fails.
pub fn write_report(path: &Path, report: &Report) -> Result<()> {
    let xml = report.to_string()?;
    fs::write(path, xml.as_bytes())?;
    info!(path = %path.display(), "wrote JUnit report");
    Ok(())
}

fn build_test_case(case: ReportCase) -> TestCase {
    let status = case_status(&case);
    let mut test_case = TestCase::new(case.name, status);
    test_case.set_classname(case.classname);
    test_case.set_timestamp(case.timestamp.and_utc().fixed_offset());
    test_case.set_time(seconds(case.elapsed_sec));
    test_case.set_system_out(case.stdout);
    if let Some(properties) = case.properties {
        for tag in &properties.attribute {
            test_case.add_property(split_tag(tag));
        }
    }
    test_case
}

/// Map a case's status to the JUnit outcome category. `fail`, `error` and
/// `skipped` carry the result message as both the element message and its
/// text; anything else is a plain success.
fn case_status(case: &ReportCase) -> TestCaseStatus {
    use crate::model::TestStatus;

    let mut status = match case.status {
        TestStatus::Fail => TestCaseStatus::non_success(NonSuccessKind::Failure),
        TestStatus::Error => TestCaseStatus::non_success(NonSuccessKind::Error),
        TestStatus::Skipped => TestCaseStatus::skipped(),
        TestStatus::Pass | TestStatus::Other(_) => return TestCaseStatus::success(),
    };
    if let Some(message) = &case.message {
        status.set_message(message.clone());
        status.set_description(message.clone());
    }
    status
}

/// Split a derived `"name:value"` tag into a JUnit property.
fn split_tag(tag: &str) -> Property {
    let (name, value) = tag.split_once(':').unwrap_or((tag, ""));
    Property::new(name, value)
}

fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
