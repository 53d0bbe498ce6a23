#![cfg(test)]
use std::path::PathBuf;

use serde_json::Value;
use uuid::Uuid;

use crate::storage::Fields;

/// Fresh data file path under the system temp dir; the file itself is not created.
pub fn temp_data_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("svc_{tag}_{}.json", Uuid::new_v4()))
}

/// Turn a `json!({...})` literal into a field map.
pub fn fields(v: Value) -> Fields {
    match v {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
