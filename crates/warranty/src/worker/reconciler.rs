//! Reconciliation sweep: classify claims still `pending` and report uploads
//! that no claim refers to.
//!
//! A sweep never mutates anything but claim status and invoice date, and it
//! never writes to or deletes from the upload directory.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::claim::{Claim, ClaimStatus};
use crate::error::WorkerError;
use crate::pipeline::runner::ClaimOutcome;
use crate::pipeline::{Pipeline, PipelineError};
use crate::sanitize;
use crate::storage::DocumentStorage;

use super::report::{OrphanSweep, PendingSweep, SweepReport};

pub struct ReconciliationWorker {
    pipeline: Pipeline,
    storage: Arc<dyn DocumentStorage>,
}

impl ReconciliationWorker {
    pub fn new(pipeline: Pipeline, storage: Arc<dyn DocumentStorage>) -> Self {
        Self { pipeline, storage }
    }

    /// Runs both sweeps. Never fails: a sweep that cannot run is logged as
    /// fatal and recorded in the report.
    pub async fn run(&self) -> SweepReport {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("reconcile", run_id = %run_id);

        async {
            let started_at = Utc::now();
            info!("Reconciliation started");
            let mut errors = Vec::new();

            let pending = match self.sweep_pending().await {
                Ok(sweep) => Some(sweep),
                Err(e) => {
                    error!(error = %e, "Pending sweep failed, no claims were processed");
                    errors.push(format!("pending sweep: {}", e));
                    None
                }
            };

            let orphans = match self.sweep_orphans().await {
                Ok(sweep) => Some(sweep),
                Err(e) => {
                    error!(error = %e, "Orphan scan failed");
                    errors.push(format!("orphan scan: {}", e));
                    None
                }
            };

            let report = SweepReport {
                run_id: run_id.clone(),
                started_at,
                finished_at: Utc::now(),
                pending,
                orphans,
                errors,
            };
            info!(
                clean = report.is_clean(),
                elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
                "Reconciliation completed"
            );
            report
        }
        .instrument(span)
        .await
    }

    /// Classifies every `pending` claim whose document is still present.
    ///
    /// Claims are processed one at a time and each is isolated: a failure
    /// forces that claim to `manual_review` and the sweep moves on.
    pub async fn sweep_pending(&self) -> Result<PendingSweep, WorkerError> {
        async {
            let claims = self
                .pipeline
                .store()
                .find_all_by_status(ClaimStatus::Pending)?;

            let mut sweep = PendingSweep {
                found: claims.len(),
                ..Default::default()
            };
            info!(found = sweep.found, "Pending claims to process");

            for claim in claims {
                let path = claim.invoice.location.clone();

                if !self.storage.exists(&path) {
                    warn!(
                        claim_id = claim.id,
                        path = %sanitize::redact_path(&path),
                        "Invoice file not found, claim left pending"
                    );
                    sweep.skipped_missing += 1;
                    continue;
                }

                let outcome = self
                    .pipeline
                    .process(claim.id, path, claim.installation_date)
                    .instrument(info_span!("claim", claim_id = claim.id))
                    .await;

                match outcome {
                    ClaimOutcome::Classified(result) => {
                        sweep.classified += 1;
                        sweep.record_status(result.status);
                    }
                    ClaimOutcome::ManualReviewFallback { .. } => {
                        sweep.failed += 1;
                        sweep.record_status(ClaimStatus::ManualReview);
                    }
                    ClaimOutcome::Unresolved { .. } => sweep.failed += 1,
                }
            }

            info!(
                found = sweep.found,
                classified = sweep.classified,
                skipped_missing = sweep.skipped_missing,
                failed = sweep.failed,
                approved = sweep.approved,
                rejected = sweep.rejected,
                manual_review = sweep.manual_review,
                "Pending sweep finished"
            );
            Ok::<_, WorkerError>(sweep)
        }
        .instrument(info_span!("sweep_pending"))
        .await
    }

    /// Lists uploads no claim refers to and tries extraction on each, for
    /// the log only.
    pub async fn sweep_orphans(&self) -> Result<OrphanSweep, WorkerError> {
        async {
            let files = self.storage.list_all()?;
            let claims = self.pipeline.store().find_all()?;
            let orphans = find_orphans(&files, &claims);

            let mut sweep = OrphanSweep {
                files: files.len(),
                linked: files.len() - orphans.len(),
                orphans: orphans.iter().cloned().collect(),
                ..Default::default()
            };
            info!(
                files = sweep.files,
                linked = sweep.linked,
                orphans = sweep.orphans.len(),
                "Upload directory scanned"
            );

            for name in &orphans {
                let path = self.storage.resolve(name);
                let extractor = self.pipeline.extractor().clone();
                let handle = tokio::spawn(
                    async move { extractor.extract(&path).await }.in_current_span(),
                );

                match handle.await {
                    Ok(Some(date)) => {
                        sweep.dated += 1;
                        info!(file = %name, invoice_date = %date, "Date found on unlinked upload");
                    }
                    Ok(None) => {
                        sweep.undated += 1;
                        info!(file = %name, "No date found on unlinked upload");
                    }
                    Err(join_error) => {
                        sweep.failed += 1;
                        let reason = PipelineError::from(join_error);
                        error!(file = %name, error = %reason, "Extraction crashed on unlinked upload");
                    }
                }
            }

            info!(
                dated = sweep.dated,
                undated = sweep.undated,
                failed = sweep.failed,
                "Orphan scan finished"
            );
            Ok::<_, WorkerError>(sweep)
        }
        .instrument(info_span!("sweep_orphans"))
        .await
    }
}

/// File names present in storage but referenced by no claim.
pub fn find_orphans(files: &[String], claims: &[Claim]) -> BTreeSet<String> {
    let linked: HashSet<&str> = claims
        .iter()
        .map(|c| c.invoice.stored_name.as_str())
        .collect();

    files
        .iter()
        .filter(|name| !linked.contains(name.as_str()))
        .cloned()
        .collect()
}
