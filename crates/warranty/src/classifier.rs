//! Date-window classification of warranty claims.

use chrono::{Days, NaiveDate};

use crate::claim::ClaimStatus;

pub const DEFAULT_WINDOW_DAYS: u32 = 21;

/// Inclusive calendar interval around an installation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Approves invoices dated within `window_days` of the installation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindowClassifier {
    window_days: u32,
}

impl DateWindowClassifier {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// Bounds saturate at the representable calendar range.
    pub fn window(&self, installation_date: NaiveDate) -> DateWindow {
        let days = Days::new(u64::from(self.window_days));
        DateWindow {
            start: installation_date
                .checked_sub_days(days)
                .unwrap_or(NaiveDate::MIN),
            end: installation_date
                .checked_add_days(days)
                .unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn classify(
        &self,
        installation_date: NaiveDate,
        invoice_date: Option<NaiveDate>,
    ) -> ClaimStatus {
        match invoice_date {
            None => ClaimStatus::ManualReview,
            Some(date) if self.window(installation_date).contains(date) => ClaimStatus::Approved,
            Some(_) => ClaimStatus::Rejected,
        }
    }
}

impl Default for DateWindowClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS)
    }
}

/// Free-function form of [`DateWindowClassifier::classify`].
pub fn classify(
    installation_date: NaiveDate,
    invoice_date: Option<NaiveDate>,
    window_days: u32,
) -> ClaimStatus {
    DateWindowClassifier::new(window_days).classify(installation_date, invoice_date)
}
