//! Generic resource CRUD handlers: one set serves every registered resource.

use crate::case::{to_snake_case, value_keys_to_camel_case};
use crate::error::AppError;
use crate::registry::{PkType, ResolvedResource};
use crate::response::{MetaCount, SuccessMany, SuccessOne};
use crate::state::AppState;
use crate::store::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::validation::RequestValidator;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn parse_id(id_str: &str, pk_type: &PkType) -> Result<Value, AppError> {
    Ok(match pk_type {
        PkType::Uuid => {
            let u = uuid::Uuid::parse_str(id_str)
                .map_err(|_| AppError::BadRequest("invalid uuid".into()))?;
            Value::String(u.to_string())
        }
        PkType::BigInt | PkType::Int => {
            let n: i64 = id_str
                .parse()
                .map_err(|_| AppError::BadRequest("invalid id".into()))?;
            Value::Number(n.into())
        }
        PkType::Text => Value::String(id_str.to_string()),
    })
}

/// JSON object -> column map, converting camelCase keys to snake_case.
fn body_to_map(value: Value) -> Result<HashMap<String, Value>, AppError> {
    match value {
        Value::Object(m) => Ok(m
            .into_iter()
            .map(|(k, v)| (to_snake_case(&k), v))
            .collect()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Coerce a query-param string to the column's value type so filters compare correctly.
fn query_value_for_column(resource: &ResolvedResource, col: &str, s: &str) -> Value {
    let sql_type = resource
        .column(col)
        .map(|c| c.sql_type.as_str())
        .unwrap_or("");
    match sql_type {
        "uuid" => {
            if let Ok(u) = uuid::Uuid::parse_str(s) {
                return Value::String(u.to_string());
            }
        }
        "bigint" | "integer" | "smallint" => {
            if let Ok(n) = s.parse::<i64>() {
                return Value::Number(n.into());
            }
        }
        "boolean" => {
            if s.eq_ignore_ascii_case("true") {
                return Value::Bool(true);
            }
            if s.eq_ignore_ascii_case("false") {
                return Value::Bool(false);
            }
        }
        _ => {}
    }
    Value::String(s.to_string())
}

fn lookup<'a>(state: &'a AppState, path: &str) -> Result<&'a ResolvedResource, AppError> {
    state
        .registry
        .resource_by_path(path)
        .ok_or_else(|| AppError::NotFound(path.to_string()))
}

fn require_op(resource: &ResolvedResource, op: &str) -> Result<(), AppError> {
    if resource.allows(op) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{} not allowed", op)))
    }
}

fn camel(mut row: Value) -> Value {
    value_keys_to_camel_case(&mut row);
    row
}

pub async fn list(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<SuccessMany<Value>>), AppError> {
    let resource = lookup(&state, &path_segment)?;
    require_op(resource, "read")?;

    let mut limit = DEFAULT_LIMIT;
    let mut offset = 0u32;
    let mut filters: Vec<(String, Value)> = Vec::new();
    for (k, v) in params {
        match k.as_str() {
            "limit" => {
                if let Ok(n) = v.parse() {
                    limit = n;
                }
            }
            "offset" => {
                if let Ok(n) = v.parse() {
                    offset = n;
                }
            }
            _ => {
                let col = to_snake_case(&k);
                if resource.column(&col).is_some() {
                    let val = query_value_for_column(resource, &col, &v);
                    filters.push((col, val));
                }
            }
        }
    }
    let limit = limit.min(MAX_LIMIT);

    let rows = state.store.list(resource, &filters, limit, offset).await?;
    let rows: Vec<Value> = rows.into_iter().map(camel).collect();
    let count = rows.len() as u64;
    Ok((
        StatusCode::OK,
        Json(SuccessMany {
            data: rows,
            meta: MetaCount { count },
        }),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    Path(path_segment): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<SuccessOne<Value>>), AppError> {
    let resource = lookup(&state, &path_segment)?;
    require_op(resource, "create")?;
    let body = body_to_map(body)?;
    RequestValidator::validate(&body, &resource.validation)?;
    RequestValidator::validate_columns(&body, resource)?;
    let row = state.store.create(resource, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessOne {
            data: camel(row),
            meta: None,
        }),
    ))
}

pub async fn read(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<(StatusCode, Json<SuccessOne<Value>>), AppError> {
    let resource = lookup(&state, &path_segment)?;
    require_op(resource, "read")?;
    let id = parse_id(&id_str, &resource.pk_type)?;
    let row = state
        .store
        .read(resource, &id)
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    Ok((
        StatusCode::OK,
        Json(SuccessOne {
            data: camel(row),
            meta: None,
        }),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<SuccessOne<Value>>), AppError> {
    let resource = lookup(&state, &path_segment)?;
    require_op(resource, "update")?;
    let id = parse_id(&id_str, &resource.pk_type)?;
    let body = body_to_map(body)?;
    RequestValidator::validate_partial(&body, &resource.validation)?;
    let row = state
        .store
        .update(resource, &id, &body)
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    Ok((
        StatusCode::OK,
        Json(SuccessOne {
            data: camel(row),
            meta: None,
        }),
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((path_segment, id_str)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let resource = lookup(&state, &path_segment)?;
    require_op(resource, "delete")?;
    let id = parse_id(&id_str, &resource.pk_type)?;
    state
        .store
        .delete(resource, &id)
        .await?
        .ok_or(AppError::NotFound(id_str))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_ids_per_pk_type() {
        assert_eq!(parse_id("42", &PkType::BigInt).unwrap(), json!(42));
        assert!(parse_id("felix", &PkType::BigInt).is_err());
        assert_eq!(
            parse_id("felix", &PkType::Text).unwrap(),
            json!("felix")
        );
        assert!(parse_id("not-a-uuid", &PkType::Uuid).is_err());
        let u = "6c95c9f4-0ae6-4d0e-9e34-7b8f3f4c2f11";
        assert_eq!(parse_id(u, &PkType::Uuid).unwrap(), json!(u));
    }

    #[test]
    fn body_keys_become_snake_case() {
        let m = body_to_map(json!({"firstName": "Ada", "year": 1999})).unwrap();
        assert_eq!(m.get("first_name"), Some(&json!("Ada")));
        assert_eq!(m.get("year"), Some(&json!(1999)));
        assert!(body_to_map(json!([1, 2])).is_err());
    }
}
