use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExtractError;

/// Free-form document data returned by an OCR service.
///
/// Only `date` is read by the pipeline; everything else is kept for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl OcrResponse {
    pub fn with_date(date: &str) -> Self {
        Self {
            date: Some(Value::String(date.to_string())),
            other: Map::new(),
        }
    }

    /// The `date` field when it is a non-empty string.
    pub fn date_str(&self) -> Option<&str> {
        self.date
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// An external document data-extraction service.
#[async_trait]
pub trait DocumentOcr: Send + Sync {
    async fn process_document(&self, path: &Path) -> Result<OcrResponse, ExtractError>;
}
