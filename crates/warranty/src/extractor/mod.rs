//! Invoice date extraction on top of an OCR service.

pub mod date;
pub mod ocr;
pub mod veryfi;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::ExtractError;
use crate::sanitize;

pub use date::parse_calendar_date;
pub use ocr::{DocumentOcr, OcrResponse};
pub use veryfi::{VeryfiClient, VeryfiCredentials};

/// Best-effort invoice date extraction.
///
/// Every failure (missing file, network, timeout, bad payload, bad date)
/// is logged with its cause and reported as an absent date.
#[derive(Clone)]
pub struct DateExtractor {
    ocr: Arc<dyn DocumentOcr>,
    timeout: Duration,
}

impl DateExtractor {
    pub fn new(ocr: Arc<dyn DocumentOcr>, timeout: Duration) -> Self {
        Self { ocr, timeout }
    }

    pub async fn extract(&self, path: &Path) -> Option<NaiveDate> {
        let span = info_span!("extract", filename = %sanitize::redact_path(path));

        async {
            match self.try_extract(path).await {
                Ok(date) => {
                    debug!(invoice_date = %date, "Invoice date extracted");
                    Some(date)
                }
                Err(e) => {
                    warn!(
                        cause = e.cause(),
                        path = %path.display(),
                        error = %e,
                        "No invoice date extracted"
                    );
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Like [`extract`](Self::extract) but keeps the failure cause.
    pub async fn try_extract(&self, path: &Path) -> Result<NaiveDate, ExtractError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        let response = tokio::time::timeout(self.timeout, self.ocr.process_document(path))
            .await
            .map_err(|_| ExtractError::Timeout {
                secs: self.timeout.as_secs(),
            })??;

        let raw = response.date_str().ok_or(ExtractError::DateMissing)?;
        parse_calendar_date(raw).ok_or_else(|| ExtractError::MalformedDate(raw.to_string()))
    }
}
