//! # Configuration File
//!
//! Reads `augnorm.toml`, the optional file that supplies a default database
//! URL and schema name so `--db`/`--schema-name` don't have to be repeated
//! on every invocation.
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/myapp"
//! schema = "public"
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "augnorm.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AugnormConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub schema: Option<String>,
}

/// Returns `None` if `augnorm.toml` doesn't exist in `dir`; this file is optional.
pub fn read_config(dir: &Path) -> Result<Option<AugnormConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: AugnormConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(config))
}
