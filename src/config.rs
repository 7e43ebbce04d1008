use crate::analyzer::PriceComparison;
use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DB_URL_ENV: &str = "PRICE_CHECK_DB_URL";
pub const CONFIG_PATH_ENV: &str = "PRICE_CHECK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Identifier of the document holding `product_urls`.
    pub seed_document_id: String,
    pub log_dir: String,
    pub log_file: String,
    pub log_level: String,
    pub price_comparison: PriceComparison,
    /// Left unset the HTTP client keeps its default (no timeout).
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed_document_id: "66d68495ac9fe4fa400a75ed".into(),
            log_dir: "logs".into(),
            log_file: "app.log".into(),
            log_level: "debug".into(),
            price_comparison: PriceComparison::default(),
            request_timeout_secs: None,
        }
    }
}

/// Connection settings for the document store, taken from the environment.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_value(std::env::var(DB_URL_ENV).ok())
    }

    fn from_value(value: Option<String>) -> Result<Self, ConfigError> {
        match value {
            Some(url) if !url.trim().is_empty() => Ok(Self { url }),
            _ => Err(ConfigError::MissingEnv(DB_URL_ENV.into())),
        }
    }
}

/// Path of the JSON config file, `PRICE_CHECK_CONFIG` or `config.json`.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into())
}

/// Loads the config file; a missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(e.into()),
    };
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
