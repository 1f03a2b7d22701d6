//! In-memory backend for the embedded profile and tests. Schemaless: rows are
//! shaped by the registry at write time, so no migrations are needed.

use crate::error::AppError;
use crate::registry::{PkType, ResolvedResource};
use crate::store::ResourceStore;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Default)]
struct Table {
    rows: Vec<Value>,
    next_id: i64,
}

#[derive(Default)]
pub struct MemStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pk_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_i64() == y.as_i64(),
        _ => a == b,
    }
}

fn filter_matches(resource: &ResolvedResource, row: &Value, col: &str, want: &Value) -> bool {
    let have = row.get(col).unwrap_or(&Value::Null);
    let ignore_case = resource
        .column(col)
        .map(|c| c.filter_ignore_case)
        .unwrap_or(false);
    if ignore_case {
        if let (Some(h), Some(w)) = (have.as_str(), want.as_str()) {
            return h.eq_ignore_ascii_case(w);
        }
    }
    match (have, want) {
        (Value::Number(h), Value::Number(w)) => h.as_f64() == w.as_f64(),
        _ => have == want,
    }
}

fn sort_by_pk(resource: &ResolvedResource, rows: &mut [Value]) {
    let pk = &resource.pk_column;
    rows.sort_by(|a, b| {
        let av = a.get(pk).unwrap_or(&Value::Null);
        let bv = b.get(pk).unwrap_or(&Value::Null);
        match (av.as_i64(), bv.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => av
                .as_str()
                .unwrap_or("")
                .cmp(bv.as_str().unwrap_or("")),
        }
    });
}

#[async_trait]
impl ResourceStore for MemStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn list(
        &self,
        resource: &ResolvedResource,
        filters: &[(String, Value)],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>, AppError> {
        let tables = self.tables.read();
        let mut rows: Vec<Value> = tables
            .get(&resource.table_name)
            .map(|t| {
                t.rows
                    .iter()
                    .filter(|row| {
                        filters
                            .iter()
                            .all(|(col, want)| filter_matches(resource, row, col, want))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_by_pk(resource, &mut rows);
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn read(
        &self,
        resource: &ResolvedResource,
        id: &Value,
    ) -> Result<Option<Value>, AppError> {
        let tables = self.tables.read();
        Ok(tables.get(&resource.table_name).and_then(|t| {
            t.rows
                .iter()
                .find(|row| pk_eq(row.get(&resource.pk_column).unwrap_or(&Value::Null), id))
                .cloned()
        }))
    }

    async fn create(
        &self,
        resource: &ResolvedResource,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError> {
        let mut tables = self.tables.write();
        let table = tables.entry(resource.table_name.clone()).or_default();

        let now = Value::String(Utc::now().to_rfc3339());
        let mut row = Map::new();
        for col in &resource.columns {
            let v = match body.get(&col.name) {
                Some(v) => v.clone(),
                None if col.name == resource.pk_column => match resource.pk_type {
                    PkType::BigInt | PkType::Int => {
                        table.next_id += 1;
                        Value::Number(table.next_id.into())
                    }
                    PkType::Uuid => Value::String(uuid::Uuid::new_v4().to_string()),
                    PkType::Text => {
                        return Err(AppError::Validation(format!(
                            "{} is required",
                            resource.pk_column
                        )))
                    }
                },
                None if col.sql_type == "timestamptz" && col.has_default => now.clone(),
                None => Value::Null,
            };
            row.insert(col.name.clone(), v);
        }

        let id = row
            .get(&resource.pk_column)
            .cloned()
            .unwrap_or(Value::Null);
        if let Some(n) = id.as_i64() {
            // keep the sequence ahead of explicitly supplied ids
            if n > table.next_id {
                table.next_id = n;
            }
        }
        if table
            .rows
            .iter()
            .any(|r| pk_eq(r.get(&resource.pk_column).unwrap_or(&Value::Null), &id))
        {
            return Err(AppError::Conflict(format!(
                "{} {} already exists",
                resource.path_segment, id
            )));
        }

        let row = Value::Object(row);
        table.rows.push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        resource: &ResolvedResource,
        id: &Value,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError> {
        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(&resource.table_name) else {
            return Ok(None);
        };
        let Some(row) = table
            .rows
            .iter_mut()
            .find(|row| pk_eq(row.get(&resource.pk_column).unwrap_or(&Value::Null), id))
        else {
            return Ok(None);
        };
        if let Value::Object(map) = row {
            for col in &resource.columns {
                if col.name == resource.pk_column {
                    continue;
                }
                if let Some(v) = body.get(&col.name) {
                    map.insert(col.name.clone(), v.clone());
                }
            }
            map.insert(
                "updated_at".into(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        Ok(Some(row.clone()))
    }

    async fn delete(
        &self,
        resource: &ResolvedResource,
        id: &Value,
    ) -> Result<Option<Value>, AppError> {
        let mut tables = self.tables.write();
        let Some(table) = tables.get_mut(&resource.table_name) else {
            return Ok(None);
        };
        let pos = table
            .rows
            .iter()
            .position(|row| pk_eq(row.get(&resource.pk_column).unwrap_or(&Value::Null), id));
        Ok(pos.map(|i| table.rows.remove(i)))
    }
}
