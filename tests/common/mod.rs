#![allow(dead_code)]

//! Shared harness for end-to-end tests: a temp workspace plus builders for
//! dbt artifact fixtures.

use assert_cmd::Command;
use serde_json::{Value, json};
use std::path::PathBuf;
use tempfile::TempDir;

pub const V4_SCHEMA: &str = "https://schemas.getdbt.com/dbt/run-results/v4.json";
pub const GENERATED_AT: &str = "2022-07-27T09:07:49.547633Z";

pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        dbt_junitxml::logging::init_test_logging();
        Self {
            dir: TempDir::new().expect("create temp workspace"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.path(name);
        std::fs::write(
            &path,
            serde_json::to_string_pretty(value).expect("serialize fixture"),
        )
        .expect("write fixture");
        path
    }
}

pub fn cmd() -> Command {
    Command::cargo_bin("dbt-junitxml").expect("binary builds")
}

/// A run-results document in the v4 shape with the given result entries.
pub fn run_results(results: Vec<Value>) -> Value {
    json!({
        "metadata": {
            "dbt_schema_version": V4_SCHEMA,
            "generated_at": GENERATED_AT,
        },
        "args": { "which": "test" },
        "elapsed_time": 3.27,
        "results": results,
    })
}

/// One executed result entry.
pub fn result_entry(unique_id: &str, status: &str, message: Option<&str>) -> Value {
    json!({
        "unique_id": unique_id,
        "execution_time": 0.42,
        "status": status,
        "message": message,
        "timing": [
            { "name": "execute", "started_at": "2022-07-27T09:07:45.123456Z" }
        ],
    })
}

/// A manifest document with the given `nodes` mapping.
pub fn manifest(nodes: Value) -> Value {
    json!({ "nodes": nodes })
}

/// One manifest test node carrying `compiled_sql`.
pub fn test_node(name: &str, schema: &str, path: &str, compiled_sql: &str) -> Value {
    json!({
        "resource_type": "test",
        "name": name,
        "alias": null,
        "schema": schema,
        "original_file_path": path,
        "compiled_sql": compiled_sql,
    })
}
