mod common;

use common::{Workspace, cmd, manifest, result_entry, run_results, test_node};
use predicates::prelude::*;
use serde_json::json;
use std::fs;

#[test]
fn e2e_full_conversion() {
    let workspace = Workspace::new();
    let run_path = workspace.write_json(
        "run_results.json",
        &run_results(vec![
            result_entry("test.jaffle_shop.not_null_orders_id.abc", "pass", None),
            result_entry(
                "test.jaffle_shop.unique_orders_id.def",
                "fail",
                Some("Got 3 results, configured to fail if != 0"),
            ),
            result_entry(
                "test.jaffle_shop.relationships_orders.ghi",
                "error",
                Some("Compilation Error in test relationships_orders"),
            ),
            result_entry("test.jaffle_shop.accepted_values_status.jkl", "skipped", None),
        ]),
    );
    let manifest_path = workspace.write_json(
        "manifest.json",
        &manifest(json!({
            "model.jaffle_shop.orders": { "resource_type": "model", "name": "orders" },
            "test.jaffle_shop.not_null_orders_id.abc": test_node(
                "not_null_orders_id",
                "dev_dbt",
                "models/staging/core/schema.yml",
                "select order_id from orders where order_id is null",
            ),
            "test.jaffle_shop.unique_orders_id.def": test_node(
                "unique_orders_id",
                "dev_dbt",
                "models/staging/core/schema.yml",
                "select order_id from orders group by order_id having count(*) > 1",
            ),
        })),
    );
    let output = workspace.path("report.xml");

    cmd()
        .arg("parse")
        .arg("-r")
        .arg(&run_path)
        .arg("-m")
        .arg(&manifest_path)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 test case(s)"));

    let xml = fs::read_to_string(&output).expect("report written");

    // One suite named Tests carrying all four cases.
    assert!(xml.contains("name=\"Tests\""));
    assert!(xml.contains("tests=\"4\""));
    assert!(xml.contains("failures=\"1\""));
    assert!(xml.contains("errors=\"1\""));

    // Cases keyed by canonical name, classified by full unique_id.
    assert!(xml.contains("name=\"not_null_orders_id\""));
    assert!(xml.contains("classname=\"test.jaffle_shop.unique_orders_id.def\""));

    // Diagnostics carry the result message.
    assert!(xml.contains("Got 3 results, configured to fail if != 0"));
    assert!(xml.contains("<skipped"));
    assert!(xml.contains("Compilation Error in test relationships_orders"));

    // Matched cases carry the reconstructed query plus source text.
    assert!(xml.contains("select * from dev_dbt.not_null_orders_id"));
    assert!(xml.contains("select order_id from orders where order_id is null"));

    // Unmatched cases degrade to the sentinel.
    assert!(xml.contains("N/A"));
}

#[test]
fn e2e_custom_properties_attached() {
    let workspace = Workspace::new();
    let run_path = workspace.write_json(
        "run_results.json",
        &run_results(vec![result_entry(
            "test.jaffle_shop.not_null_orders_id.abc",
            "pass",
            None,
        )]),
    );
    let manifest_path = workspace.write_json(
        "manifest.json",
        &manifest(json!({
            "test.jaffle_shop.not_null_orders_id.abc": test_node(
                "not_null_orders_id",
                "dev_dbt",
                "models/staging/core/schema.yml",
                "select 1",
            ),
        })),
    );
    let output = workspace.path("report.xml");

    cmd()
        .arg("parse")
        .arg("-r")
        .arg(&run_path)
        .arg("-m")
        .arg(&manifest_path)
        .arg("-o")
        .arg(&output)
        .arg("-p")
        .arg("Source=path_levels[1],Area=path_levels[2]")
        .arg("-p")
        .arg("version=1.2")
        .assert()
        .success();

    let xml = fs::read_to_string(&output).expect("report written");
    assert!(xml.contains("name=\"Source\""));
    assert!(xml.contains("value=\"staging\""));
    assert!(xml.contains("name=\"Area\""));
    assert!(xml.contains("value=\"core\""));
    assert!(xml.contains("name=\"version\""));
    assert!(xml.contains("value=\"1.2\""));
}

#[test]
fn e2e_no_properties_flag_means_no_property_elements() {
    let workspace = Workspace::new();
    let run_path = workspace.write_json(
        "run_results.json",
        &run_results(vec![result_entry(
            "test.jaffle_shop.not_null_orders_id.abc",
            "pass",
            None,
        )]),
    );
    let manifest_path = workspace.write_json(
        "manifest.json",
        &manifest(json!({
            "test.jaffle_shop.not_null_orders_id.abc": test_node(
                "not_null_orders_id",
                "dev_dbt",
                "models/schema.yml",
                "select 1",
            ),
        })),
    );
    let output = workspace.path("report.xml");

    cmd()
        .arg("parse")
        .arg("-r")
        .arg(&run_path)
        .arg("-m")
        .arg(&manifest_path)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let xml = fs::read_to_string(&output).expect("report written");
    assert!(!xml.contains("<property"));
}

#[test]
fn e2e_rpc_method_document_shape_accepted() {
    let workspace = Workspace::new();
    let mut run = run_results(vec![result_entry(
        "test.jaffle_shop.not_null_orders_id.abc",
        "pass",
        None,
    )]);
    run["args"] = json!({ "rpc_method": "test" });
    let run_path = workspace.write_json("run_results.json", &run);
    let manifest_path = workspace.write_json("manifest.json", &manifest(json!({})));
    let output = workspace.path("report.xml");

    cmd()
        .arg("parse")
        .arg("-r")
        .arg(&run_path)
        .arg("-m")
        .arg(&manifest_path)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    assert!(output.exists());
}
