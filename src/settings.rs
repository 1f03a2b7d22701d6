//! Runtime settings from environment variables.

use crate::error::AppError;
use std::fmt;

/// Active database backend. `Embedded` is the in-memory store used for
/// development and tests; `Postgres` is the server-based backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DbProfile {
    Embedded,
    Postgres,
}

impl DbProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbProfile::Embedded => "embedded",
            DbProfile::Postgres => "postgres",
        }
    }
}

impl fmt::Display for DbProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// Mandatory. Startup fails when unset.
    pub app_title: String,
    pub profile: DbProfile,
    /// Required for the postgres profile, unused for embedded.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub max_connections: u32,
    pub migrations_path: String,
    /// Optional JSON file with resource definitions; the built-in sample
    /// registry is used when unset.
    pub resources_path: Option<String>,
}

impl Settings {
    /// Read settings from the process environment. `APP_TITLE` has no
    /// default on purpose: a deployment that forgot its config must not come up.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let app_title = get("APP_TITLE")
            .ok_or_else(|| AppError::Config("APP_TITLE must be set".into()))?;

        let profile = match get("DB_PROFILE").as_deref() {
            None | Some("embedded") => DbProfile::Embedded,
            Some("postgres") => DbProfile::Postgres,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "unknown DB_PROFILE '{}' (expected 'embedded' or 'postgres')",
                    other
                )))
            }
        };

        let database_url = get("DATABASE_URL");
        if profile == DbProfile::Postgres && database_url.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL must be set for the postgres profile".into(),
            ));
        }

        let max_connections = match get("MAX_CONNECTIONS") {
            Some(s) => s
                .parse()
                .map_err(|_| AppError::Config(format!("invalid MAX_CONNECTIONS '{}'", s)))?,
            None => 5,
        };

        Ok(Settings {
            app_title,
            profile,
            database_url,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            max_connections,
            migrations_path: get("MIGRATIONS_PATH").unwrap_or_else(|| "migrations".into()),
            resources_path: get("RESOURCES_PATH"),
        })
    }
}
