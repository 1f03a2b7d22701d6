//! Versioned SQL migrations, applied at startup before the listener binds.
//!
//! Scripts live in a directory (settings.migrations_path) and are named
//! `V{version}__{description}.sql`. Applied versions are recorded in
//! `_schema_migrations` together with a content checksum; editing an
//! already-applied script is a startup error.

use crate::error::AppError;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct MigrationScript {
    pub version: i64,
    pub description: String,
    pub sql: String,
    pub checksum: String,
}

fn parse_file_name(name: &str) -> Option<(i64, String)> {
    let rest = name.strip_prefix('V')?.strip_suffix(".sql")?;
    let (version, description) = rest.split_once("__")?;
    let version: i64 = version.parse().ok()?;
    Some((version, description.to_string()))
}

fn checksum(sql: &str) -> String {
    hex::encode(Sha256::digest(sql.as_bytes()))
}

/// Read all migration scripts from `dir`, sorted by ascending version.
/// Duplicate versions are an error; files not matching the pattern are skipped.
pub fn load_scripts(dir: impl AsRef<Path>) -> Result<Vec<MigrationScript>, AppError> {
    let dir = dir.as_ref();
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::Migration(format!("{}: {}", dir.display(), e)))?;

    let mut scripts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::Migration(e.to_string()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some((version, description)) = parse_file_name(&name) else {
            continue;
        };
        let sql = std::fs::read_to_string(entry.path())
            .map_err(|e| AppError::Migration(format!("{}: {}", name, e)))?;
        let checksum = checksum(&sql);
        scripts.push(MigrationScript {
            version,
            description,
            sql,
            checksum,
        });
    }
    scripts.sort_by_key(|s| s.version);
    for pair in scripts.windows(2) {
        if pair[0].version == pair[1].version {
            return Err(AppError::Migration(format!(
                "duplicate migration version {}",
                pair[0].version
            )));
        }
    }
    Ok(scripts)
}

async fn ensure_history_table(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _schema_migrations (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            checksum TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Apply all pending scripts from `dir` in version order. Each script runs in
/// its own transaction together with its history row. Any error propagates so
/// the caller can abort startup.
pub async fn apply_migrations(pool: &PgPool, dir: impl AsRef<Path>) -> Result<u32, AppError> {
    let scripts = load_scripts(dir)?;
    ensure_history_table(pool).await?;

    let applied: Vec<(i64, String)> =
        sqlx::query_as("SELECT version, checksum FROM _schema_migrations ORDER BY version")
            .fetch_all(pool)
            .await?;

    let mut count = 0u32;
    for script in &scripts {
        if let Some((_, recorded)) = applied.iter().find(|(v, _)| *v == script.version) {
            if *recorded != script.checksum {
                return Err(AppError::Migration(format!(
                    "checksum mismatch for applied migration V{} ({})",
                    script.version, script.description
                )));
            }
            continue;
        }

        tracing::info!(version = script.version, description = %script.description, "applying migration");
        let mut tx = pool.begin().await?;
        sqlx::raw_sql(&script.sql).execute(&mut *tx).await.map_err(|e| {
            AppError::Migration(format!(
                "V{} ({}) failed: {}",
                script.version, script.description, e
            ))
        })?;
        sqlx::query(
            "INSERT INTO _schema_migrations (version, description, checksum) VALUES ($1, $2, $3)",
        )
        .bind(script.version)
        .bind(&script.description)
        .bind(&script.checksum)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_version_and_description() {
        assert_eq!(
            parse_file_name("V1__create_cat.sql"),
            Some((1, "create_cat".into()))
        );
        assert_eq!(
            parse_file_name("V20240101__add_index.sql"),
            Some((20240101, "add_index".into()))
        );
        assert_eq!(parse_file_name("create_cat.sql"), None);
        assert_eq!(parse_file_name("V1_create_cat.sql"), None);
        assert_eq!(parse_file_name("V1__create_cat.txt"), None);
    }

    #[test]
    fn loads_scripts_in_version_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("V2__cars.sql"), "CREATE TABLE car ()").unwrap();
        fs::write(dir.path().join("V1__cats.sql"), "CREATE TABLE cat ()").unwrap();
        fs::write(dir.path().join("README.md"), "not a migration").unwrap();

        let scripts = load_scripts(dir.path()).unwrap();
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0].version, 1);
        assert_eq!(scripts[1].version, 2);
        assert_eq!(scripts[0].description, "cats");
    }

    #[test]
    fn rejects_duplicate_versions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("V1__cats.sql"), "SELECT 1").unwrap();
        fs::write(dir.path().join("V1__cats_again.sql"), "SELECT 2").unwrap();
        let err = load_scripts(dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn checksum_tracks_content() {
        assert_eq!(checksum("SELECT 1"), checksum("SELECT 1"));
        assert_ne!(checksum("SELECT 1"), checksum("SELECT 2"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(load_scripts("/nonexistent/migrations").is_err());
    }
}
