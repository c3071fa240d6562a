use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

pub const API_KEY_VAR: &str = "COINGECKO_API_KEY";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

const DOTENV_FILE: &str = ".env";
const DEFAULT_API_BASE: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_ARTIFACTS_DIR: &str = "data";

/// Everything the ingestion pipeline needs, resolved up front so the core
/// never reads ambient process state.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base: String,
    pub api_key: String,
    pub database_url: Option<String>,
    pub artifacts_dir: PathBuf,
    pub cooldown: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Resolve the configuration from the environment, falling back to a
    /// local `.env` file for the credential and database URL.
    pub fn from_env() -> Result<Self> {
        let api_key = resolve_env_var(API_KEY_VAR).ok_or_else(|| {
            AppError::Config(format!(
                "{API_KEY_VAR} not set and not found in {DOTENV_FILE}"
            ))
        })?;

        Ok(Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
            database_url: resolve_env_var(DATABASE_URL_VAR),
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            cooldown: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
        })
    }

    /// Database URL, required once `--store-db` is requested.
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            AppError::Config(format!(
                "{DATABASE_URL_VAR} not set and not found in {DOTENV_FILE}; required with --store-db"
            ))
        })
    }
}

/// Look a variable up in the process environment first, then in `.env`.
pub fn resolve_env_var(name: &str) -> Option<String> {
    if let Ok(value) = env::var(name) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let content = fs::read_to_string(DOTENV_FILE).ok()?;
    lookup_dotenv(&content, name)
}

fn lookup_dotenv(content: &str, name: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() != name {
            continue;
        }
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}
