use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_WINDOW_DAYS;
use crate::extractor::veryfi::DEFAULT_ENDPOINT;
use crate::secrets::SecretSource;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    #[serde(default = "default_upload_directory")]
    pub upload_directory: String,
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_upload_directory() -> String {
    "uploads".to_string()
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

impl Config {
    /// Configured database file, or `~/.warranty/data/warranty.db`.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(crate::db::default_database_path)
            .unwrap_or_else(|| PathBuf::from("warranty.db"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            upload_directory: default_upload_directory(),
            database_path: None,
            window_days: DEFAULT_WINDOW_DAYS,
            ocr: OcrConfig::default(),
            worker: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key_env() -> Option<String> {
    Some("VERYFI_API_KEY".to_string())
}

fn default_timeout_secs() -> u64 {
    30
}

impl OcrConfig {
    pub fn api_key_source(&self) -> SecretSource<'_> {
        SecretSource {
            value: self.api_key.as_deref(),
            file: self.api_key_file.as_deref(),
            env_var: self.api_key_env.as_deref(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            client_id: String::new(),
            username: String::new(),
            api_key: None,
            api_key_file: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("api_key_file", &self.api_key_file)
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    3600
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// When set, events are also written to a daily-rotated file here.
    #[serde(default)]
    pub directory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();
        assert_eq!(config.upload_directory, "uploads");
        assert_eq!(config.window_days, 21);
        assert_eq!(config.ocr.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.ocr.timeout_secs, 30);
        assert_eq!(config.ocr.api_key_env.as_deref(), Some("VERYFI_API_KEY"));
        assert_eq!(config.worker.interval_secs, 3600);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_explicit_database_path() {
        let config = Config {
            database_path: Some("/var/lib/warranty/claims.db".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/warranty/claims.db")
        );
    }

    #[test]
    fn test_default_database_path_under_home() {
        let path = Config::default().database_path();
        assert!(path.ends_with("warranty.db"));
    }

    #[test]
    fn test_ocr_debug_hides_api_key() {
        let ocr = OcrConfig {
            api_key: Some("sk-live-123".to_string()),
            ..OcrConfig::default()
        };
        let debug = format!("{:?}", ocr);
        assert!(!debug.contains("sk-live-123"));
        assert!(debug.contains("****"));
    }

    #[test]
    fn test_log_format_lowercase() {
        let logging: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(logging.format, LogFormat::Json);
    }
}
