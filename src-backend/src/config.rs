//! Backend Configuration
//!
//! JSON config file with per-field defaults, plus environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, DomainResult, DEFAULT_MAX_TARGET_ITEMS};

pub const CONFIG_FILE_NAME: &str = "shoplist_config.json";

pub const ENV_DB_PATH: &str = "SHOPLIST_DB_PATH";
pub const ENV_COMPLETION_ENDPOINT: &str = "SHOPLIST_COMPLETION_ENDPOINT";
pub const ENV_COMPLETION_API_KEY: &str = "SHOPLIST_COMPLETION_API_KEY";
pub const ENV_COMPLETION_MODEL: &str = "SHOPLIST_COMPLETION_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub session_ttl_secs: u64,
    pub completion: CompletionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("shoplist.db"),
            log_dir: None,
            session_ttl_secs: 24 * 60 * 60,
            completion: CompletionConfig::default(),
        }
    }
}

/// Settings for the text-completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Target entries beyond this count are dropped (first ones kept)
    pub max_products: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            timeout_secs: 30,
            max_products: DEFAULT_MAX_TARGET_ITEMS,
        }
    }
}

/// Load config from `path`; a missing file yields defaults.
/// Environment overrides are applied afterwards.
pub fn load_config(path: &Path) -> DomainResult<AppConfig> {
    let mut config = if path.exists() {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Unexpected(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str::<AppConfig>(&text)
            .map_err(|e| DomainError::Validation(format!("Invalid config {}: {}", path.display(), e)))?
    } else {
        log::info!("No config at {}, using defaults", path.display());
        AppConfig::default()
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Write config as pretty JSON
pub fn save_config(path: &Path, config: &AppConfig) -> DomainResult<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| DomainError::Unexpected(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| DomainError::Unexpected(format!("Failed to write {}: {}", path.display(), e)))
}

fn apply_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(path) = lookup(ENV_DB_PATH) {
        config.db_path = PathBuf::from(path);
    }
    if let Some(endpoint) = lookup(ENV_COMPLETION_ENDPOINT) {
        config.completion.endpoint = endpoint;
    }
    if let Some(key) = lookup(ENV_COMPLETION_API_KEY) {
        config.completion.api_key = key;
    }
    if let Some(model) = lookup(ENV_COMPLETION_MODEL) {
        config.completion.model = model;
    }
}
