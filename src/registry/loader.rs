//! Build the resolved registry from raw definitions, a JSON file, or the
//! built-in sample set.

use crate::error::RegistryError;
use crate::registry::resolved::{ColumnInfo, PkType, Registry, ResolvedResource};
use crate::registry::types::*;
use crate::registry::validate;
use std::collections::HashSet;
use std::path::Path;

/// Resolve raw definitions into the runtime registry. Validates first.
pub fn resolve(defs: &[ResourceDef]) -> Result<Registry, RegistryError> {
    validate(defs)?;

    let mut resources = Vec::with_capacity(defs.len());
    for def in defs {
        let pk_col = def
            .columns
            .iter()
            .find(|c| c.name == def.primary_key)
            .ok_or_else(|| RegistryError::InvalidPrimaryKey {
                resource: def.path_segment.clone(),
                column: def.primary_key.clone(),
            })?;
        let pk_type = infer_pk_type(&pk_col.type_);

        let mut columns: Vec<ColumnInfo> = def
            .columns
            .iter()
            .map(|c| ColumnInfo {
                name: c.name.clone(),
                pk_type: if c.name == def.primary_key {
                    Some(pk_type.clone())
                } else {
                    None
                },
                nullable: c.nullable,
                has_default: c.has_default,
                sql_type: normalize_type(&c.type_),
                filter_ignore_case: c.filter_ignore_case,
            })
            .collect();

        let declared: HashSet<&str> = def.columns.iter().map(|c| c.name.as_str()).collect();
        for name in ["created_at", "updated_at"] {
            if !declared.contains(name) {
                columns.push(ColumnInfo {
                    name: name.to_string(),
                    pk_type: None,
                    nullable: false,
                    has_default: true,
                    sql_type: "timestamptz".into(),
                    filter_ignore_case: false,
                });
            }
        }

        resources.push(ResolvedResource {
            path_segment: def.path_segment.clone(),
            table_name: def.table.clone(),
            pk_column: def.primary_key.clone(),
            pk_type,
            columns,
            operations: def.operations.clone(),
            validation: def.validation.clone(),
        });
    }

    Ok(Registry::new(resources))
}

/// Load raw definitions from a JSON file (array of resource defs) and resolve.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Registry, RegistryError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| RegistryError::Load(format!("{}: {}", path.as_ref().display(), e)))?;
    let defs: Vec<ResourceDef> =
        serde_json::from_str(&text).map_err(|e| RegistryError::Load(e.to_string()))?;
    resolve(&defs)
}

fn normalize_type(type_: &str) -> String {
    // "bigserial" is a creation-time shorthand; at bind time it is a bigint.
    let base = type_.split('(').next().unwrap_or(type_).trim().to_lowercase();
    match base.as_str() {
        "bigserial" => "bigint".into(),
        "serial" => "integer".into(),
        "int" => "integer".into(),
        "varchar" => "text".into(),
        other => other.to_string(),
    }
}

fn infer_pk_type(type_: &str) -> PkType {
    let lower = type_.to_lowercase();
    if lower.contains("uuid") {
        PkType::Uuid
    } else if lower.contains("bigserial") || lower.contains("bigint") {
        PkType::BigInt
    } else if lower.contains("serial") || lower.contains("int") {
        PkType::Int
    } else {
        PkType::Text
    }
}

/// Built-in sample registry used when `RESOURCES_PATH` is unset: a trivial
/// named entity and one with a few typed columns and a case-insensitive finder.
pub fn sample_defs() -> Vec<ResourceDef> {
    let mut cat_validation = std::collections::HashMap::new();
    cat_validation.insert(
        "name".to_string(),
        ValidationRule {
            required: Some(true),
            max_length: Some(100),
            ..Default::default()
        },
    );

    let mut car_validation = std::collections::HashMap::new();
    car_validation.insert(
        "year".to_string(),
        ValidationRule {
            // first production automobile
            minimum: Some(1886.0),
            ..Default::default()
        },
    );

    vec![
        ResourceDef {
            path_segment: "cats".into(),
            table: "cat".into(),
            primary_key: "id".into(),
            columns: vec![
                ColumnDef {
                    name: "id".into(),
                    type_: "bigserial".into(),
                    nullable: false,
                    has_default: true,
                    filter_ignore_case: false,
                },
                ColumnDef {
                    name: "name".into(),
                    type_: "text".into(),
                    nullable: false,
                    has_default: false,
                    filter_ignore_case: false,
                },
            ],
            operations: default_ops(),
            validation: cat_validation,
        },
        ResourceDef {
            path_segment: "cars".into(),
            table: "car".into(),
            primary_key: "id".into(),
            columns: vec![
                ColumnDef {
                    name: "id".into(),
                    type_: "bigserial".into(),
                    nullable: false,
                    has_default: true,
                    filter_ignore_case: false,
                },
                ColumnDef {
                    name: "make".into(),
                    type_: "text".into(),
                    nullable: false,
                    has_default: false,
                    filter_ignore_case: true,
                },
                ColumnDef {
                    name: "model".into(),
                    type_: "text".into(),
                    nullable: false,
                    has_default: false,
                    filter_ignore_case: false,
                },
                ColumnDef {
                    name: "year".into(),
                    type_: "integer".into(),
                    nullable: false,
                    has_default: false,
                    filter_ignore_case: false,
                },
                ColumnDef {
                    name: "color".into(),
                    type_: "text".into(),
                    nullable: true,
                    has_default: false,
                    filter_ignore_case: false,
                },
            ],
            operations: default_ops(),
            validation: car_validation,
        },
    ]
}

fn default_ops() -> Vec<String> {
    ["create", "read", "update", "delete"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Resolve the built-in sample registry.
pub fn sample() -> Registry {
    // sample_defs is validated by tests; resolving it cannot fail
    resolve(&sample_defs()).unwrap_or_else(|_| Registry::new(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_registry_resolves() {
        let registry = resolve(&sample_defs()).expect("sample defs must resolve");
        assert_eq!(registry.len(), 2);

        let cats = registry.resource_by_path("cats").unwrap();
        assert_eq!(cats.table_name, "cat");
        assert_eq!(cats.pk_type, PkType::BigInt);
        assert!(cats.allows("create"));

        let cars = registry.resource_by_path("cars").unwrap();
        assert!(cars.column("make").unwrap().filter_ignore_case);
        assert_eq!(cars.column("year").unwrap().sql_type, "integer");
    }

    #[test]
    fn appends_timestamp_columns() {
        let registry = resolve(&sample_defs()).unwrap();
        let cats = registry.resource_by_path("cats").unwrap();
        let created = cats.column("created_at").unwrap();
        assert!(created.has_default);
        assert_eq!(created.sql_type, "timestamptz");
        assert!(cats.column("updated_at").is_some());
    }

    #[test]
    fn infers_pk_types() {
        assert_eq!(infer_pk_type("uuid"), PkType::Uuid);
        assert_eq!(infer_pk_type("bigserial"), PkType::BigInt);
        assert_eq!(infer_pk_type("serial"), PkType::Int);
        assert_eq!(infer_pk_type("text"), PkType::Text);
    }

    #[test]
    fn normalizes_bind_types() {
        assert_eq!(normalize_type("bigserial"), "bigint");
        assert_eq!(normalize_type("varchar(64)"), "text");
        assert_eq!(normalize_type("timestamptz"), "timestamptz");
    }

    #[test]
    fn load_from_file_reports_missing_path() {
        let err = load_from_file("/nonexistent/resources.json").unwrap_err();
        assert!(matches!(err, RegistryError::Load(_)));
    }
}
