use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::claim::ClaimStatus;

/// Counts from one pass over `pending` claims.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingSweep {
    pub found: usize,
    pub classified: usize,
    pub skipped_missing: usize,
    pub failed: usize,
    pub approved: usize,
    pub rejected: usize,
    pub manual_review: usize,
}

impl PendingSweep {
    pub(crate) fn record_status(&mut self, status: ClaimStatus) {
        match status {
            ClaimStatus::Approved => self.approved += 1,
            ClaimStatus::Rejected => self.rejected += 1,
            ClaimStatus::ManualReview => self.manual_review += 1,
            ClaimStatus::Pending => {}
        }
    }
}

/// Result of the diagnostic scan for uploads no claim refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanSweep {
    pub files: usize,
    pub linked: usize,
    pub orphans: Vec<String>,
    pub dated: usize,
    pub undated: usize,
    /// Extraction attempts that crashed instead of returning.
    pub failed: usize,
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `None` when the pending sweep could not run at all.
    pub pending: Option<PendingSweep>,
    /// `None` when the orphan scan could not run at all.
    pub orphans: Option<OrphanSweep>,
    /// Fatal errors, one per sweep that could not run.
    pub errors: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
            && self.pending.as_ref().map_or(true, |p| p.failed == 0)
            && self.orphans.as_ref().map_or(true, |o| o.failed == 0)
    }
}
