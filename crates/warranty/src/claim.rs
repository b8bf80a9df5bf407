//! Warranty claim records and the values the pipeline writes into them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type ClaimId = i64;

/// Lifecycle state of a claim.
///
/// Claims are created `Pending`. The classification pipeline moves them to
/// `Approved`, `Rejected` or `ManualReview`; staff may override any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
    ManualReview,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 4] = [
        ClaimStatus::Pending,
        ClaimStatus::Approved,
        ClaimStatus::Rejected,
        ClaimStatus::ManualReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "pending",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::ManualReview => "manual_review",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown claim status '{0}' (expected pending, approved, rejected or manual_review)")]
pub struct ParseStatusError(pub String);

impl FromStr for ClaimStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// The uploaded invoice attached to a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    /// Where the file lives on disk.
    pub location: PathBuf,
    /// Name of the file inside the upload directory.
    pub stored_name: String,
    /// Name the submitter's device gave the file.
    pub original_name: String,
    pub mime_type: String,
}

impl InvoiceDocument {
    pub fn location(&self) -> &Path {
        &self.location
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub owner_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub product_name: String,
    pub installation_date: NaiveDate,
    pub invoice_date: Option<NaiveDate>,
    pub invoice: InvoiceDocument,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data supplied at submission time. Claims built from it always start `Pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClaim {
    pub owner_id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub product_name: String,
    pub installation_date: NaiveDate,
    pub invoice: InvoiceDocument,
}

/// Outcome of one extraction + classification run. Not persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub invoice_date: Option<NaiveDate>,
    pub status: ClaimStatus,
}

/// Fields written back onto a claim.
///
/// `invoice_date: None` leaves any stored invoice date untouched, so writing
/// the same update twice is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimUpdate {
    pub status: ClaimStatus,
    pub invoice_date: Option<NaiveDate>,
}

impl ClaimUpdate {
    pub fn status_only(status: ClaimStatus) -> Self {
        Self {
            status,
            invoice_date: None,
        }
    }

    pub fn manual_review() -> Self {
        Self::status_only(ClaimStatus::ManualReview)
    }
}

impl From<ClassificationResult> for ClaimUpdate {
    fn from(result: ClassificationResult) -> Self {
        Self {
            status: result.status,
            invoice_date: result.invoice_date,
        }
    }
}
