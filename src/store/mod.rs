//! Swappable persistence backends behind the `ResourceStore` trait.
//! Rows travel as JSON objects keyed by column name.

mod mem;
mod pg;

pub use mem::MemStore;
pub use pg::{ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::registry::ResolvedResource;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Backend reachability check for the readiness endpoint.
    async fn ping(&self) -> Result<(), AppError>;

    async fn list(
        &self,
        resource: &ResolvedResource,
        filters: &[(String, Value)],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>, AppError>;

    async fn read(
        &self,
        resource: &ResolvedResource,
        id: &Value,
    ) -> Result<Option<Value>, AppError>;

    async fn create(
        &self,
        resource: &ResolvedResource,
        body: &HashMap<String, Value>,
    ) -> Result<Value, AppError>;

    async fn update(
        &self,
        resource: &ResolvedResource,
        id: &Value,
        body: &HashMap<String, Value>,
    ) -> Result<Option<Value>, AppError>;

    async fn delete(
        &self,
        resource: &ResolvedResource,
        id: &Value,
    ) -> Result<Option<Value>, AppError>;
}
