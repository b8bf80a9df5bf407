use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variables that override file settings, kept compatible with
/// existing deployments.
pub const ENV_WINDOW_DAYS: &str = "WARRANTY_DATE_WINDOW";
pub const ENV_UPLOAD_DIR: &str = "UPLOAD_DIR";
pub const ENV_DATABASE_PATH: &str = "WARRANTY_DATABASE_PATH";
pub const ENV_OCR_CLIENT_ID: &str = "VERYFI_CLIENT_ID";
pub const ENV_OCR_USERNAME: &str = "VERYFI_USERNAME";

/// Loads a config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config = load_config_from_str(&content)?;
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Loads `path` when given, otherwise starts from defaults; environment
/// overrides apply either way.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = Config::default();
            apply_env_overrides(&mut config)?;
            Ok(config)
        }
    }
}

/// Parses and validates config JSON. Does not consult the environment.
pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Applies overrides from `lookup` (an environment-like getter), then
/// re-validates the result.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(value) = lookup(ENV_WINDOW_DAYS) {
        config.window_days =
            value
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidOverride {
                    name: ENV_WINDOW_DAYS.to_string(),
                    value: value.clone(),
                    reason: e.to_string(),
                })?;
    }
    if let Some(value) = lookup(ENV_UPLOAD_DIR) {
        config.upload_directory = value;
    }
    if let Some(value) = lookup(ENV_DATABASE_PATH) {
        config.database_path = Some(value);
    }
    if let Some(value) = lookup(ENV_OCR_CLIENT_ID) {
        config.ocr.client_id = value;
    }
    if let Some(value) = lookup(ENV_OCR_USERNAME) {
        config.ocr.username = value;
    }

    validate_config(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.upload_directory.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "upload_directory must not be empty".to_string(),
        });
    }

    if config.ocr.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "ocr.timeout_secs must be greater than zero".to_string(),
        });
    }

    if config.worker.interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "worker.interval_secs must be greater than zero".to_string(),
        });
    }

    Ok(())
}
