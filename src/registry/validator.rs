//! Definition validation: path uniqueness, primary keys, column types.

use crate::error::RegistryError;
use crate::registry::ResourceDef;
use std::collections::HashSet;

/// SQL type names the store layer knows how to bind and decode.
const KNOWN_TYPES: &[&str] = &[
    "bigserial",
    "bigint",
    "serial",
    "integer",
    "int",
    "smallint",
    "text",
    "varchar",
    "boolean",
    "uuid",
    "timestamptz",
    "timestamp",
    "date",
    "double precision",
    "real",
    "numeric",
    "jsonb",
    "json",
];

fn base_type(type_: &str) -> &str {
    // "varchar(255)" validates as "varchar"
    type_.split('(').next().unwrap_or(type_).trim()
}

pub fn validate(defs: &[ResourceDef]) -> Result<(), RegistryError> {
    let mut paths = HashSet::new();
    for def in defs {
        if !paths.insert(def.path_segment.as_str()) {
            return Err(RegistryError::DuplicatePathSegment(def.path_segment.clone()));
        }
        if def.columns.is_empty() {
            return Err(RegistryError::NoColumns(def.path_segment.clone()));
        }
        if !def.columns.iter().any(|c| c.name == def.primary_key) {
            return Err(RegistryError::InvalidPrimaryKey {
                resource: def.path_segment.clone(),
                column: def.primary_key.clone(),
            });
        }
        for col in &def.columns {
            let base = base_type(&col.type_).to_lowercase();
            if !KNOWN_TYPES.contains(&base.as_str()) {
                return Err(RegistryError::UnknownColumnType(col.type_.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ColumnDef;

    fn def(path: &str, pk: &str, cols: &[(&str, &str)]) -> ResourceDef {
        ResourceDef {
            path_segment: path.into(),
            table: path.trim_end_matches('s').into(),
            primary_key: pk.into(),
            columns: cols
                .iter()
                .map(|(name, ty)| ColumnDef {
                    name: name.to_string(),
                    type_: ty.to_string(),
                    nullable: true,
                    has_default: false,
                    filter_ignore_case: false,
                })
                .collect(),
            operations: vec!["read".into()],
            validation: Default::default(),
        }
    }

    #[test]
    fn accepts_well_formed_defs() {
        let defs = vec![
            def("cats", "id", &[("id", "bigserial"), ("name", "text")]),
            def("cars", "id", &[("id", "bigserial"), ("make", "varchar(64)")]),
        ];
        assert!(validate(&defs).is_ok());
    }

    #[test]
    fn rejects_duplicate_path_segments() {
        let defs = vec![
            def("cats", "id", &[("id", "bigserial")]),
            def("cats", "id", &[("id", "bigserial")]),
        ];
        assert!(matches!(
            validate(&defs),
            Err(RegistryError::DuplicatePathSegment(_))
        ));
    }

    #[test]
    fn rejects_missing_pk_column() {
        let defs = vec![def("cats", "cat_id", &[("id", "bigserial")])];
        assert!(matches!(
            validate(&defs),
            Err(RegistryError::InvalidPrimaryKey { .. })
        ));
    }

    #[test]
    fn rejects_unknown_column_type() {
        let defs = vec![def("cats", "id", &[("id", "hyperloglog")])];
        assert!(matches!(
            validate(&defs),
            Err(RegistryError::UnknownColumnType(_))
        ));
    }
}
