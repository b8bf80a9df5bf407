use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarrantyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid value '{value}' for environment override {name}: {reason}")]
    InvalidOverride {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Secret resolution failed: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

/// Failures inside the OCR extractor. These never reach the classifier;
/// `DateExtractor::extract` logs them and reports an absent date.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Document not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read document '{path}': {source}")]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR request failed: {0}")]
    Transport(String),

    #[error("OCR service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed OCR response: {0}")]
    MalformedResponse(String),

    #[error("OCR call timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("OCR response has no date field")]
    DateMissing,

    #[error("Unparseable invoice date '{0}'")]
    MalformedDate(String),
}

impl ExtractError {
    /// Stable label for the `cause` field of extractor log events.
    pub fn cause(&self) -> &'static str {
        match self {
            ExtractError::FileNotFound(_) => "file_missing",
            ExtractError::ReadDocument { .. } => "file_unreadable",
            ExtractError::Transport(_) => "network",
            ExtractError::Status { .. } => "service_error",
            ExtractError::MalformedResponse(_) => "malformed_response",
            ExtractError::Timeout { .. } => "timeout",
            ExtractError::DateMissing => "no_date",
            ExtractError::MalformedDate(_) => "malformed_date",
        }
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to list upload directory '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Upload rejected: {0}")]
    Rejected(String),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Claim store unavailable: {0}")]
    Store(#[from] crate::db::DatabaseError),

    #[error("Upload storage unavailable: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, WarrantyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_causes_are_distinct() {
        let errors = [
            ExtractError::FileNotFound(PathBuf::from("/x.pdf")),
            ExtractError::Transport("refused".to_string()),
            ExtractError::Status {
                status: 500,
                body: String::new(),
            },
            ExtractError::MalformedResponse("eof".to_string()),
            ExtractError::Timeout { secs: 30 },
            ExtractError::DateMissing,
            ExtractError::MalformedDate("soon".to_string()),
        ];

        let mut causes: Vec<&str> = errors.iter().map(|e| e.cause()).collect();
        causes.sort_unstable();
        causes.dedup();
        assert_eq!(causes.len(), errors.len());
    }

    #[test]
    fn test_worker_error_wraps_storage() {
        let err = WorkerError::from(StorageError::Rejected("too big".to_string()));
        assert!(err.to_string().contains("too big"));
    }
}
