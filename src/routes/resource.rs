//! Resource CRUD routes. Paths are parameterized so the Path extractors
//! receive the segment and id; handlers resolve the resource by path.

use crate::handlers::resource::{create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    Router::new()
        .route("/:path_segment", get(list).post(create))
        .route(
            "/:path_segment/:id",
            get(read)
                .patch(update)
                .put(update)
                .delete(delete_handler),
        )
        .with_state(state)
}
