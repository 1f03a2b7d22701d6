//! Resolved resource model: definitions validated and flattened for runtime use.

use crate::registry::ValidationRule;
use std::collections::HashMap;

/// Primary key type for parsing path ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PkType {
    Uuid,
    BigInt,
    Int,
    Text,
}

#[derive(Clone, Debug)]
pub struct ColumnInfo {
    pub name: String,
    pub pk_type: Option<PkType>,
    pub nullable: bool,
    pub has_default: bool,
    /// SQL type name for casts (e.g. "timestamptz") when binding string values.
    pub sql_type: String,
    pub filter_ignore_case: bool,
}

#[derive(Clone, Debug)]
pub struct ResolvedResource {
    pub path_segment: String,
    pub table_name: String,
    pub pk_column: String,
    pub pk_type: PkType,
    pub columns: Vec<ColumnInfo>,
    pub operations: Vec<String>,
    pub validation: HashMap<String, ValidationRule>,
}

impl ResolvedResource {
    pub fn allows(&self, op: &str) -> bool {
        self.operations.iter().any(|o| o == op)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Clone, Debug)]
pub struct Registry {
    pub resources: Vec<ResolvedResource>,
    by_path: HashMap<String, usize>,
}

impl Registry {
    pub fn new(resources: Vec<ResolvedResource>) -> Self {
        let by_path = resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.path_segment.clone(), i))
            .collect();
        Registry { resources, by_path }
    }

    pub fn resource_by_path(&self, path: &str) -> Option<&ResolvedResource> {
        self.by_path.get(path).map(|&i| &self.resources[i])
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
