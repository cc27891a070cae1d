//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and fetching behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Survey endpoint settings
    #[serde(default)]
    pub survey: SurveyConfig,

    /// Persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        url::Url::parse(&self.survey.endpoint).map_err(|e| {
            AppError::validation(format!("survey.endpoint is not a valid URL: {e}"))
        })?;
        if self.survey.page_size == 0 {
            return Err(AppError::validation("survey.page_size must be > 0"));
        }
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(AppError::validation("storage.db_path is empty"));
        }
        Ok(())
    }
}

/// HTTP client and fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent page fetches within one seed
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Survey endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Base URL of the survey listing endpoint
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Rows requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            page_size: defaults::page_size(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file
    #[serde(default = "defaults::db_path")]
    pub db_path: PathBuf,

    /// Default JSON export file
    #[serde(default = "defaults::export_path")]
    pub export_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::db_path(),
            export_path: defaults::export_path(),
        }
    }
}

/// Default values for configuration fields.
mod defaults {
    use std::path::PathBuf;

    pub fn user_agent() -> String {
        format!("gradscrape/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn max_concurrent() -> usize {
        8
    }

    pub fn endpoint() -> String {
        "https://www.thegradcafe.com/survey/index.php".to_string()
    }

    pub fn page_size() -> u32 {
        250
    }

    pub fn db_path() -> PathBuf {
        PathBuf::from("data/posts.sqlite")
    }

    pub fn export_path() -> PathBuf {
        PathBuf::from("data/posts.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_field_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            max_concurrent = 2

            [survey]
            page_size = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_concurrent, 2);
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.survey.page_size, 50);
        assert!(config.survey.endpoint.starts_with("https://"));
        assert_eq!(config.storage.db_path, PathBuf::from("data/posts.sqlite"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.crawler.max_concurrent = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.survey.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
