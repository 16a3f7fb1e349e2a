use std::collections::HashSet;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Keys accepted by the internal operational endpoints (/readyz, /metrics).
    pub internal_api_keys: HashSet<String>,
    pub port: u16,
    pub rust_log: String,
    /// Snapshot file consumed by the seed binary; ignored by the server.
    pub snapshot_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            internal_api_keys: parse_internal_api_keys(&require_env("INTERNAL_API_KEYS")?)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            snapshot_path: std::env::var("SITE_SNAPSHOT_PATH")
                .unwrap_or_else(|_| "content/snapshot.json".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_internal_api_keys(raw: &str) -> Result<HashSet<String>> {
    let keys: HashSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect();

    if keys.is_empty() {
        bail!("INTERNAL_API_KEYS must include at least one non-empty key");
    }

    Ok(keys)
}
