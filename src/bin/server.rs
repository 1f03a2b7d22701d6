//! Server entry point. Startup order: settings, registry, store (with
//! migrations under the postgres profile), then the HTTP listener. Any
//! failure before `serve` terminates the process.

use datarest::{
    app_router, apply_migrations, ensure_database_exists, registry, AppState, DbProfile, MemStore,
    PgStore, ResourceStore, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("datarest=info".parse()?),
        )
        .init();

    let settings = Settings::from_env()?;

    let reg = match &settings.resources_path {
        Some(path) => registry::load_from_file(path)?,
        None => registry::sample(),
    };
    tracing::info!(resources = reg.len(), profile = %settings.profile, "registry resolved");

    let store: Arc<dyn ResourceStore> = match settings.profile {
        DbProfile::Postgres => {
            let database_url = settings
                .database_url
                .clone()
                .ok_or("DATABASE_URL must be set for the postgres profile")?;
            ensure_database_exists(&database_url).await?;
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .connect(&database_url)
                .await?;
            let applied = apply_migrations(&pool, &settings.migrations_path).await?;
            tracing::info!(applied, "migrations up to date");
            Arc::new(PgStore::new(pool))
        }
        DbProfile::Embedded => {
            tracing::info!("embedded profile: in-memory store, migrations skipped");
            Arc::new(MemStore::new())
        }
    };

    let bind_addr = settings.bind_addr.clone();
    let state = AppState::new(store, reg, settings);
    let app = app_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
