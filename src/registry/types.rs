//! Raw resource definitions as they appear in a resources JSON file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// SQL type name (e.g. "bigserial", "text", "integer", "uuid", "timestamptz").
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Whether the database supplies a value when the column is omitted
    /// (serial, NOW(), gen_random_uuid()).
    #[serde(default)]
    pub has_default: bool,
    /// Query-param filters on this column compare case-insensitively.
    #[serde(default)]
    pub filter_ignore_case: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

fn default_operations() -> Vec<String> {
    ["create", "read", "update", "delete"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceDef {
    /// URL path segment the resource is exposed under (e.g. "cats").
    pub path_segment: String,
    /// Backing table name (e.g. "cat").
    pub table: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDef>,
    #[serde(default = "default_operations")]
    pub operations: Vec<String>,
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
}
