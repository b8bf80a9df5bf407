pub mod claim;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod pipeline;
pub mod sanitize;
pub mod secrets;
pub mod storage;
pub mod worker;

pub use claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate, ClassificationResult, NewClaim};
pub use classifier::{classify, DateWindowClassifier, DEFAULT_WINDOW_DAYS};
pub use config::{load_config, Config};
pub use db::{ClaimStore, Database, DatabaseError};
pub use error::{
    ConfigError, ExtractError, Result, StorageError, WarrantyError, WorkerError,
};
pub use extractor::{DateExtractor, DocumentOcr, OcrResponse, VeryfiClient, VeryfiCredentials};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, SubmissionProcessor};
pub use secrets::{SecretError, SecretSource};
pub use storage::{DocumentStorage, UploadDirectory};
pub use worker::{ReconciliationWorker, SweepReport, SweepScheduler};
