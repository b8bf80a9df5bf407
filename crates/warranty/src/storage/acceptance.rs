//! Rules for letting a document into the upload directory.

use std::path::Path;

use chrono::Utc;
use log::info;
use uuid::Uuid;

use super::{DocumentStorage, UploadDirectory};
use crate::claim::InvoiceDocument;
use crate::error::StorageError;

/// Largest invoice accepted, in bytes (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Document types accepted as invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptedMime {
    Jpeg,
    Jpg,
    Png,
    Pdf,
}

impl AcceptedMime {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(AcceptedMime::Jpeg),
            "image/jpg" => Some(AcceptedMime::Jpg),
            "image/png" => Some(AcceptedMime::Png),
            "application/pdf" => Some(AcceptedMime::Pdf),
            _ => None,
        }
    }

    /// Guesses the type from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        mime_guess::from_path(path)
            .iter_raw()
            .find_map(Self::from_mime)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AcceptedMime::Jpeg => "image/jpeg",
            AcceptedMime::Jpg => "image/jpg",
            AcceptedMime::Png => "image/png",
            AcceptedMime::Pdf => "application/pdf",
        }
    }
}

/// Copies `source` into the upload directory under a fresh unique name.
///
/// The file is rejected when its type is not an [`AcceptedMime`] or when it
/// is larger than [`MAX_UPLOAD_BYTES`]. The source file is left in place.
pub fn accept(uploads: &UploadDirectory, source: &Path) -> Result<InvoiceDocument, StorageError> {
    let mime = AcceptedMime::from_path(source).ok_or_else(|| {
        StorageError::Rejected(format!(
            "invalid file type for '{}': only JPEG, JPG, PNG and PDF files are allowed",
            source.display()
        ))
    })?;

    let metadata = std::fs::metadata(source).map_err(|e| StorageError::ReadFile {
        path: source.to_path_buf(),
        source: e,
    })?;
    if !metadata.is_file() {
        return Err(StorageError::Rejected(format!(
            "'{}' is not a regular file",
            source.display()
        )));
    }
    if metadata.len() > MAX_UPLOAD_BYTES {
        return Err(StorageError::Rejected(format!(
            "'{}' is {} bytes, larger than the {} byte limit",
            source.display(),
            metadata.len(),
            MAX_UPLOAD_BYTES
        )));
    }

    uploads.ensure_exists()?;

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();
    let stored_name = format!(
        "{}-{}{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    );
    let location = uploads.resolve(&stored_name);

    std::fs::copy(source, &location).map_err(|e| StorageError::WriteFile {
        path: location.clone(),
        source: e,
    })?;

    let original_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| stored_name.clone());

    info!(
        "Accepted upload {} as {} ({})",
        original_name,
        stored_name,
        mime.as_str()
    );

    Ok(InvoiceDocument {
        location,
        stored_name,
        original_name,
        mime_type: mime.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_mime() {
        assert_eq!(AcceptedMime::from_mime("image/jpeg"), Some(AcceptedMime::Jpeg));
        assert_eq!(AcceptedMime::from_mime("image/jpg"), Some(AcceptedMime::Jpg));
        assert_eq!(AcceptedMime::from_mime("IMAGE/PNG"), Some(AcceptedMime::Png));
        assert_eq!(
            AcceptedMime::from_mime("application/pdf"),
            Some(AcceptedMime::Pdf)
        );
        assert_eq!(AcceptedMime::from_mime("text/plain"), None);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(
            AcceptedMime::from_path(Path::new("scan.PDF")),
            Some(AcceptedMime::Pdf)
        );
        assert_eq!(
            AcceptedMime::from_path(Path::new("photo.jpg")),
            Some(AcceptedMime::Jpeg)
        );
        assert_eq!(AcceptedMime::from_path(Path::new("notes.txt")), None);
        assert_eq!(AcceptedMime::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_accept_copies_under_unique_name() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("invoice.pdf");
        std::fs::write(&source, b"%PDF-1.4").unwrap();
        let uploads = UploadDirectory::new(temp.path().join("uploads"));

        let first = accept(&uploads, &source).unwrap();
        let second = accept(&uploads, &source).unwrap();

        assert_ne!(first.stored_name, second.stored_name);
        assert!(first.stored_name.ends_with(".pdf"));
        assert_eq!(first.original_name, "invoice.pdf");
        assert_eq!(first.mime_type, "application/pdf");
        assert_eq!(std::fs::read(first.location()).unwrap(), b"%PDF-1.4");
        assert!(source.exists());
        assert_eq!(uploads.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_accept_rejects_wrong_type() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("invoice.txt");
        std::fs::write(&source, b"hello").unwrap();
        let uploads = UploadDirectory::new(temp.path().join("uploads"));

        let err = accept(&uploads, &source).unwrap_err();
        assert!(matches!(err, StorageError::Rejected(_)));
    }

    #[test]
    fn test_accept_rejects_oversized_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("huge.png");
        let file = std::fs::File::create(&source).unwrap();
        file.set_len(MAX_UPLOAD_BYTES + 1).unwrap();
        let uploads = UploadDirectory::new(temp.path().join("uploads"));

        let err = accept(&uploads, &source).unwrap_err();
        assert!(matches!(err, StorageError::Rejected(_)));
        assert!(!uploads.root().exists());
    }

    #[test]
    fn test_accept_missing_source() {
        let temp = TempDir::new().unwrap();
        let uploads = UploadDirectory::new(temp.path().join("uploads"));
        let err = accept(&uploads, &temp.path().join("gone.pdf")).unwrap_err();
        assert!(matches!(err, StorageError::ReadFile { .. }));
    }
}
