//! Config echo handlers: report effective settings over HTTP.

use crate::response::SuccessOne;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct ConfigProperty {
    pub key: &'static str,
    pub value: Value,
}

pub async fn app_title(State(state): State<AppState>) -> Json<SuccessOne<ConfigProperty>> {
    Json(SuccessOne {
        data: ConfigProperty {
            key: "app.title",
            value: Value::String(state.settings.app_title.clone()),
        },
        meta: None,
    })
}

pub async fn active_profile(State(state): State<AppState>) -> Json<SuccessOne<ConfigProperty>> {
    Json(SuccessOne {
        data: ConfigProperty {
            key: "db.profile",
            value: Value::String(state.settings.profile.to_string()),
        },
        meta: None,
    })
}

/// Null when no database URL is configured (embedded profile).
pub async fn database_url(State(state): State<AppState>) -> Json<SuccessOne<ConfigProperty>> {
    let value = state
        .settings
        .database_url
        .clone()
        .map(Value::String)
        .unwrap_or(Value::Null);
    Json(SuccessOne {
        data: ConfigProperty {
            key: "database.url",
            value,
        },
        meta: None,
    })
}
