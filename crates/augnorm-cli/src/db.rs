//! Shared connection-resolution helper for the `compile`/`diff` commands.

use anyhow::{anyhow, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config;

/// Explicit flag, then `DATABASE_URL`, then `.env`, then `augnorm.toml`.
pub fn resolve_db_url(explicit: Option<&str>) -> Result<String> {
    if let Some(url) = explicit {
        tracing::debug!("using database URL from --db flag");
        return Ok(url.to_string());
    }
    if let Ok(url) = std::env::var("DATABASE_URL") {
        tracing::debug!("using database URL from DATABASE_URL");
        return Ok(url);
    }
    if dotenvy::dotenv().is_ok() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            tracing::debug!("using database URL from .env");
            return Ok(url);
        }
    }
    if let Some(cfg) = config::read_config(std::path::Path::new("."))? {
        if let Some(url) = cfg.database.url {
            tracing::debug!("using database URL from augnorm.toml");
            return Ok(url);
        }
    }
    tracing::warn!("no database URL found in --db, DATABASE_URL, .env, or augnorm.toml");
    Err(anyhow!(
        "no database URL given. Pass --db, set DATABASE_URL, or add [database] url to augnorm.toml"
    ))
}

pub async fn connect(url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "failed to connect to Postgres");
            anyhow!("failed to connect to Postgres: {e}")
        })
}

/// Schema name, falling back to `augnorm.toml`'s `[database] schema`, then `"public"`.
pub fn resolve_schema_name(explicit: Option<&str>) -> Result<String> {
    if let Some(name) = explicit {
        return Ok(name.to_string());
    }
    if let Some(cfg) = config::read_config(std::path::Path::new("."))? {
        if let Some(name) = cfg.database.schema {
            return Ok(name);
        }
    }
    tracing::debug!("no schema configured, defaulting to 'public'");
    Ok("public".to_string())
}
