//! Extraction, classification and persistence of a single claim.

pub mod config;
pub mod error;
pub mod runner;
pub mod submission;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use runner::Pipeline;
pub use submission::SubmissionProcessor;
