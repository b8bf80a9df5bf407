use std::path::PathBuf;
use std::time::Duration;

use crate::classifier::DEFAULT_WINDOW_DAYS;
use crate::config::Config;

/// Immutable settings handed to the extractor, classifier and worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub window_days: u32,
    pub upload_directory: PathBuf,
    pub ocr_timeout: Duration,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            window_days: config.window_days,
            upload_directory: PathBuf::from(&config.upload_directory),
            ocr_timeout: Duration::from_secs(config.ocr.timeout_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
