use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn, Instrument};

use crate::claim::{ClaimId, ClaimUpdate, ClassificationResult};
use crate::classifier::DateWindowClassifier;
use crate::db::ClaimStore;
use crate::extractor::{DateExtractor, DocumentOcr};
use crate::sanitize;

use super::config::PipelineConfig;
use super::error::PipelineError;

/// How one claim left the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Extraction and classification ran and the result was stored.
    Classified(ClassificationResult),
    /// Processing failed and the claim was forced to `manual_review`.
    ManualReviewFallback { reason: String },
    /// Processing failed and so did the fallback write; the claim is still
    /// `pending` and the next sweep will pick it up.
    Unresolved { reason: String },
}

impl ClaimOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, ClaimOutcome::Classified(_))
    }
}

/// Extractor, classifier and claim store wired together.
#[derive(Clone)]
pub struct Pipeline {
    extractor: DateExtractor,
    classifier: DateWindowClassifier,
    store: Arc<dyn ClaimStore>,
}

impl Pipeline {
    /// Production constructor: builds the extractor and classifier from config.
    pub fn new(
        config: &PipelineConfig,
        ocr: Arc<dyn DocumentOcr>,
        store: Arc<dyn ClaimStore>,
    ) -> Self {
        Self {
            extractor: DateExtractor::new(ocr, config.ocr_timeout),
            classifier: DateWindowClassifier::new(config.window_days),
            store,
        }
    }

    pub fn extractor(&self) -> &DateExtractor {
        &self.extractor
    }

    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    /// Extracts and classifies without touching the store.
    pub async fn classify_document(
        &self,
        path: &Path,
        installation_date: NaiveDate,
    ) -> ClassificationResult {
        let invoice_date = self.extractor.extract(path).await;
        ClassificationResult {
            invoice_date,
            status: self.classifier.classify(installation_date, invoice_date),
        }
    }

    /// Extracts, classifies and writes the result onto the claim.
    pub async fn run(
        &self,
        claim_id: ClaimId,
        path: &Path,
        installation_date: NaiveDate,
    ) -> Result<ClassificationResult, PipelineError> {
        let result = self.classify_document(path, installation_date).await;

        self.store.update(claim_id, &ClaimUpdate::from(result))?;

        info!(
            claim_id,
            path = %sanitize::redact_path(path),
            invoice_date = ?result.invoice_date,
            status = %result.status,
            "Claim classified"
        );
        Ok(result)
    }

    /// Runs [`run`](Self::run) in its own task and falls back to
    /// `manual_review` when it fails or panics.
    pub async fn process(
        &self,
        claim_id: ClaimId,
        path: PathBuf,
        installation_date: NaiveDate,
    ) -> ClaimOutcome {
        let pipeline = self.clone();
        let task_path = path.clone();
        let handle = tokio::spawn(
            async move { pipeline.run(claim_id, &task_path, installation_date).await }
                .in_current_span(),
        );

        let failure = match handle.await {
            Ok(Ok(result)) => return ClaimOutcome::Classified(result),
            Ok(Err(e)) => e,
            Err(join_error) => PipelineError::from(join_error),
        };

        error!(
            claim_id,
            path = %sanitize::redact_path(&path),
            error = %failure,
            "Claim processing failed"
        );

        let reason = failure.to_string();
        match self.force_manual_review(claim_id) {
            Ok(()) => {
                warn!(
                    claim_id,
                    reason = %reason,
                    status = "manual_review",
                    "Claim set for manual review after processing failure"
                );
                ClaimOutcome::ManualReviewFallback { reason }
            }
            Err(e) => {
                error!(
                    claim_id,
                    error = %e,
                    "Could not set manual review; claim stays pending for the next sweep"
                );
                ClaimOutcome::Unresolved {
                    reason: format!("{}; fallback failed: {}", reason, e),
                }
            }
        }
    }

    pub fn force_manual_review(&self, claim_id: ClaimId) -> Result<(), PipelineError> {
        self.store.update(claim_id, &ClaimUpdate::manual_review())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{ClaimStatus, InvoiceDocument, NewClaim};
    use crate::db::Database;
    use crate::error::ExtractError;
    use crate::extractor::OcrResponse;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct FixedOcr(Option<&'static str>);

    #[async_trait]
    impl DocumentOcr for FixedOcr {
        async fn process_document(&self, _path: &Path) -> Result<OcrResponse, ExtractError> {
            match self.0 {
                Some(date) => Ok(OcrResponse::with_date(date)),
                None => Ok(OcrResponse::default()),
            }
        }
    }

    struct PanickingOcr;

    #[async_trait]
    impl DocumentOcr for PanickingOcr {
        async fn process_document(&self, _path: &Path) -> Result<OcrResponse, ExtractError> {
            panic!("ocr client bug");
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup(ocr: Arc<dyn DocumentOcr>) -> (TempDir, Arc<Database>, Pipeline, ClaimId, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let db = Arc::new(Database::open_in_memory().unwrap());
        let claim = db
            .create_pending_claim(&NewClaim {
                owner_id: 1,
                customer_name: "c".to_string(),
                customer_phone: "p".to_string(),
                product_name: "boiler".to_string(),
                installation_date: date(2025, 5, 8),
                invoice: InvoiceDocument {
                    location: path.clone(),
                    stored_name: "a.pdf".to_string(),
                    original_name: "a.pdf".to_string(),
                    mime_type: "application/pdf".to_string(),
                },
            })
            .unwrap();

        let config = PipelineConfig {
            window_days: 21,
            upload_directory: temp.path().to_path_buf(),
            ocr_timeout: Duration::from_secs(1),
        };
        let pipeline = Pipeline::new(&config, ocr, db.clone());
        (temp, db, pipeline, claim.id, path)
    }

    #[tokio::test]
    async fn test_run_approves_date_inside_window() {
        let (_temp, db, pipeline, id, path) = setup(Arc::new(FixedOcr(Some("2025-04-28"))));

        let result = pipeline.run(id, &path, date(2025, 5, 8)).await.unwrap();
        assert_eq!(result.status, ClaimStatus::Approved);

        let claim = db.find_by_id(id).unwrap().unwrap();
        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.invoice_date, Some(date(2025, 4, 28)));
    }

    #[tokio::test]
    async fn test_run_without_date_is_manual_review() {
        let (_temp, db, pipeline, id, path) = setup(Arc::new(FixedOcr(None)));

        pipeline.run(id, &path, date(2025, 5, 8)).await.unwrap();
        let claim = db.find_by_id(id).unwrap().unwrap();
        assert_eq!(claim.status, ClaimStatus::ManualReview);
        assert!(claim.invoice_date.is_none());
    }

    #[tokio::test]
    async fn test_run_unknown_claim_is_store_error() {
        let (_temp, _db, pipeline, _id, path) = setup(Arc::new(FixedOcr(Some("2025-04-28"))));
        let err = pipeline.run(999, &path, date(2025, 5, 8)).await.unwrap_err();
        assert!(matches!(err, PipelineError::Store(_)));
    }

    #[tokio::test]
    async fn test_process_panic_falls_back_to_manual_review() {
        let (_temp, db, pipeline, id, path) = setup(Arc::new(PanickingOcr));

        let outcome = pipeline.process(id, path, date(2025, 5, 8)).await;
        assert!(matches!(outcome, ClaimOutcome::ManualReviewFallback { .. }));
        assert!(outcome.is_failure());
        assert_eq!(
            db.find_by_id(id).unwrap().unwrap().status,
            ClaimStatus::ManualReview
        );
    }

    #[tokio::test]
    async fn test_process_unknown_claim_is_unresolved() {
        let (_temp, _db, pipeline, _id, path) = setup(Arc::new(FixedOcr(Some("2025-04-28"))));
        let outcome = pipeline.process(999, path, date(2025, 5, 8)).await;
        assert!(matches!(outcome, ClaimOutcome::Unresolved { .. }));
    }
}
