//! Configuration loading and management for wikisnip.
//!
//! Loads settings from `wikisnip.toml` with an environment variable override
//! for the default language.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding `wikipedia.default_lang`.
pub const LANG_ENV: &str = "WIKISNIP_LANG";

lazy_static! {
    static ref LANG_CODE: Regex =
        Regex::new(r"^[a-z]{2,12}(-[a-z0-9]{1,12})*$").expect("invalid language regex");
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid language code: {0:?}")]
    InvalidLang(String),
}

/// Check that `code` looks like a Wikipedia language subdomain.
pub fn is_valid_lang(code: &str) -> bool {
    LANG_CODE.is_match(code)
}

/// Wikipedia lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    /// Language used when neither the user nor the channel has set one
    pub default_lang: String,
}

/// Outgoing line settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Maximum length of a reply line in bytes
    pub max_length: usize,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

/// Storage paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base path for data storage
    pub path: PathBuf,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wikipedia: WikipediaConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from the default location (wikisnip.toml in cwd or home).
    /// Falls back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::parse_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::parse_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(lang) = std::env::var(LANG_ENV) {
            self.wikipedia.default_lang = lang;
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_lang(&self.wikipedia.default_lang) {
            return Err(ConfigError::InvalidLang(
                self.wikipedia.default_lang.clone(),
            ));
        }
        Ok(())
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from("wikisnip.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("wikisnip")
            .join("wikisnip.toml");
        home_config.exists().then_some(home_config)
    }
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            default_lang: "en".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { max_length: 400 }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.wikipedia.default_lang, "en");
        assert_eq!(config.output.max_length, 400);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.storage.path, PathBuf::from("./data"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml("[wikipedia]\ndefault_lang = \"pl\"\n").unwrap();
        assert_eq!(config.wikipedia.default_lang, "pl");
        assert_eq!(config.output.max_length, 400);
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.wikipedia.default_lang, "en");
    }

    #[test]
    fn test_rejects_bad_language() {
        let err = Config::from_toml("[wikipedia]\ndefault_lang = \"en.evil.com/\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLang(_)));
    }

    #[test]
    fn test_language_codes() {
        assert!(is_valid_lang("en"));
        assert!(is_valid_lang("simple"));
        assert!(is_valid_lang("zh-min-nan"));
        assert!(is_valid_lang("be-tarask"));
        assert!(!is_valid_lang("e"));
        assert!(!is_valid_lang("EN"));
        assert!(!is_valid_lang("en/wiki"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikisnip.toml");
        std::fs::write(&path, "[output]\nmax_length = 300\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output.max_length, 300);
    }
}
