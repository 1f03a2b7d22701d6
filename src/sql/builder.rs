//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from a resolved resource.

use crate::registry::ResolvedResource;
use serde_json::Value;
use std::collections::HashMap;

/// Quote identifier for PostgreSQL (safe: identifiers come from the registry only).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT list: numeric columns as ::text so decoding stays lossless.
fn select_column_list(resource: &ResolvedResource) -> String {
    resource
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            if c.sql_type == "numeric" {
                format!("{}::text", q)
            } else {
                q
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn cast_placeholder(resource: &ResolvedResource, col: &str, n: usize) -> String {
    match resource.column(col).map(|c| c.sql_type.as_str()) {
        Some("timestamptz") | Some("timestamp") | Some("date") | Some("uuid") => {
            let ty = resource.column(col).map(|c| c.sql_type.clone()).unwrap_or_default();
            format!("${}::{}", n, ty)
        }
        _ => format!("${}", n),
    }
}

/// SELECT by primary key. Caller binds the id as the sole parameter.
pub fn select_by_id(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table_name);
    let cols = select_column_list(resource);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = $1",
        cols,
        table,
        quoted(&resource.pk_column)
    );
    q
}

/// SELECT list with optional filters (exact match per column, lowercase
/// folding for columns flagged filter_ignore_case), ORDER BY pk, LIMIT/OFFSET.
pub fn select_list(
    resource: &ResolvedResource,
    filters: &[(String, Value)],
    limit: u32,
    offset: u32,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table_name);

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        let Some(info) = resource.column(col) else { continue };
        let n = q.push_param(val.clone());
        if info.filter_ignore_case {
            where_parts.push(format!("LOWER({}) = LOWER(${})", quoted(col), n));
        } else {
            where_parts.push(format!("{} = {}", quoted(col), cast_placeholder(resource, col, n)));
        }
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let cols = select_column_list(resource);
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        cols,
        table,
        where_clause,
        quoted(&resource.pk_column),
        limit,
        offset
    );
    q
}

/// INSERT: columns from the resource, values from body. The pk is excluded
/// when the body omits it and the column has a default (serial, uuid default).
/// Columns with a DB default are skipped when no value is provided.
pub fn insert(resource: &ResolvedResource, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table_name);
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in &resource.columns {
        let val = body.get(&c.name).cloned();
        if val.is_none() && c.has_default {
            continue;
        }
        let n = q.push_param(val.unwrap_or(Value::Null));
        cols.push(quoted(&c.name));
        placeholders.push(cast_placeholder(resource, &c.name, n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(resource)
    );
    q
}

/// UPDATE by id: SET only columns present in body, always bumps updated_at.
/// Falls back to a plain SELECT when the body carries no known columns.
pub fn update(resource: &ResolvedResource, id: &Value, body: &HashMap<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table_name);
    let pk = &resource.pk_column;
    let mut sets = Vec::new();
    for c in &resource.columns {
        if c.name == *pk {
            continue;
        }
        let Some(v) = body.get(&c.name) else { continue };
        let n = q.push_param(v.clone());
        sets.push(format!("{} = {}", quoted(&c.name), cast_placeholder(resource, &c.name, n)));
    }
    if sets.is_empty() {
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            select_column_list(resource),
            table,
            quoted(pk)
        );
        q.params.push(id.clone());
        return q;
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        sets.join(", "),
        quoted(pk),
        id_param,
        select_column_list(resource)
    );
    q
}

/// DELETE by id. Caller binds the id as the sole parameter.
pub fn delete(resource: &ResolvedResource) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(&resource.table_name);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        table,
        quoted(&resource.pk_column),
        select_column_list(resource)
    );
    q
}
