//! Shared application state for all routes.

use crate::registry::Registry;
use crate::settings::Settings;
use crate::store::ResourceStore;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResourceStore>,
    pub registry: Arc<Registry>,
    pub settings: Arc<Settings>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn ResourceStore>, registry: Registry, settings: Settings) -> Self {
        AppState {
            store,
            registry: Arc::new(registry),
            settings: Arc::new(settings),
            started_at: Instant::now(),
        }
    }
}
