//! Config echo routes.

use crate::handlers::config::{active_profile, app_title, database_url};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn config_routes(state: AppState) -> Router {
    Router::new()
        .route("/config/app-title", get(app_title))
        .route("/config/active-profile", get(active_profile))
        .route("/config/database-url", get(database_url))
        .with_state(state)
}
