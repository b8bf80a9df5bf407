use std::path::PathBuf;

use chrono::NaiveDate;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, Instrument};

use crate::claim::{Claim, ClaimId, NewClaim};

use super::error::PipelineError;
use super::runner::{ClaimOutcome, Pipeline};

/// Classifies a claim in the background right after it is created.
///
/// Callers get the `pending` claim back immediately. The returned handle may
/// be dropped; the reconciliation sweep covers any claim the background task
/// never finished.
#[derive(Clone)]
pub struct SubmissionProcessor {
    pipeline: Pipeline,
}

impl SubmissionProcessor {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Stores a new `pending` claim and dispatches its classification.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(
        &self,
        claim: &NewClaim,
    ) -> Result<(Claim, JoinHandle<ClaimOutcome>), PipelineError> {
        let created = self.pipeline.store().create_pending_claim(claim)?;
        info!(
            claim_id = created.id,
            owner_id = created.owner_id,
            status = %created.status,
            "Claim submitted"
        );

        let handle = self.dispatch(
            created.id,
            created.invoice.location.clone(),
            created.installation_date,
        );
        Ok((created, handle))
    }

    /// Fire-and-forget classification of one claim.
    ///
    /// Failures never reach the caller: they end as `manual_review` on the
    /// claim, or as a logged error when even that write fails.
    pub fn dispatch(
        &self,
        claim_id: ClaimId,
        document_path: PathBuf,
        installation_date: NaiveDate,
    ) -> JoinHandle<ClaimOutcome> {
        let pipeline = self.pipeline.clone();
        let span = info_span!("submission", claim_id);

        debug!(claim_id, "Dispatching background classification");
        tokio::spawn(
            async move {
                pipeline
                    .process(claim_id, document_path, installation_date)
                    .await
            }
            .instrument(span),
        )
    }
}
