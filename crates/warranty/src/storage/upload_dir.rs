use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use super::DocumentStorage;
use crate::error::StorageError;

/// Flat directory of uploaded invoices.
#[derive(Debug, Clone)]
pub struct UploadDirectory {
    root: PathBuf,
}

impl UploadDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the directory if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root).map_err(|e| StorageError::CreateDirectory {
            path: self.root.clone(),
            source: e,
        })
    }
}

impl DocumentStorage for UploadDirectory {
    fn exists(&self, location: &Path) -> bool {
        location.is_file()
    }

    fn list_all(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                // Depth 0 is the root itself: nothing can be listed.
                Err(e) if e.depth() == 0 => {
                    return Err(StorageError::ScanFailed {
                        path: self.root.clone(),
                        source: e,
                    })
                }
                Err(e) => {
                    warn!("Skipping unreadable upload entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => warn!(
                    "Skipping upload with non UTF-8 name: {}",
                    entry.path().display()
                ),
            }
        }

        names.sort();
        debug!("Listed {} uploads in {}", names.len(), self.root.display());
        Ok(names)
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}
