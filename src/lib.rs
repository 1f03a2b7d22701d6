//! datarest: registry-driven REST service. Resources declared in the registry
//! are exposed as CRUD endpoints by a single generic handler set, backed by
//! PostgreSQL or an embedded in-memory store.

pub mod case;
pub mod error;
pub mod handlers;
pub mod migrate;
pub mod registry;
pub mod response;
pub mod routes;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;
pub mod validation;

pub use error::{AppError, RegistryError};
pub use migrate::apply_migrations;
pub use registry::{load_from_file, resolve, Registry, ResolvedResource};
pub use routes::{app_router, common_routes, config_routes, resource_routes};
pub use settings::{DbProfile, Settings};
pub use state::AppState;
pub use store::{ensure_database_exists, MemStore, PgStore, ResourceStore};
pub use validation::RequestValidator;
