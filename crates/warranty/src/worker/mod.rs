//! Scheduled reconciliation of pending claims and unlinked uploads.

pub mod reconciler;
pub mod report;
pub mod scheduler;

pub use reconciler::{find_orphans, ReconciliationWorker};
pub use report::{OrphanSweep, PendingSweep, SweepReport};
pub use scheduler::SweepScheduler;
