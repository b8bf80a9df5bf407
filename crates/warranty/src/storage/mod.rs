mod acceptance;
mod upload_dir;

use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub use acceptance::{accept, AcceptedMime, MAX_UPLOAD_BYTES};
pub use upload_dir::UploadDirectory;

/// Read-only view of where uploaded invoices live.
///
/// The pipeline never writes or deletes through this interface.
pub trait DocumentStorage: Send + Sync {
    /// Whether a regular file exists at `location`.
    fn exists(&self, location: &Path) -> bool;

    /// Names of every file in the storage root, sorted.
    fn list_all(&self) -> Result<Vec<String>, StorageError>;

    /// Full path of a stored file by name.
    fn resolve(&self, name: &str) -> PathBuf;
}
