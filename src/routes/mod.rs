//! Router assembly.

mod common;
mod config;
mod resource;

pub use common::common_routes;
pub use config::config_routes;
pub use resource::resource_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Full application router: health/config routes take precedence over the
/// parameterized resource routes (static segments win in axum's matcher).
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(config_routes(state.clone()))
        .merge(resource_routes(state))
        .layer(TraceLayer::new_for_http())
}
