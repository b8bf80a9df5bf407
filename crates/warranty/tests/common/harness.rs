//! Isolated environment for pipeline and worker tests.
//!
//! `TestHarness` owns a temp upload directory, an in-memory SQLite store
//! wrapped in a `FlakyStore` for failure injection, and a `ScriptedOcr`
//! whose replies are keyed by file name.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tempfile::TempDir;

use warranty::claim::{Claim, ClaimId, ClaimStatus, ClaimUpdate, NewClaim};
use warranty::db::{ClaimStore, Database, DatabaseError};
use warranty::error::ExtractError;
use warranty::extractor::{DocumentOcr, OcrResponse};
use warranty::pipeline::{Pipeline, PipelineConfig, SubmissionProcessor};
use warranty::storage::UploadDirectory;
use warranty::worker::ReconciliationWorker;

use super::builders::ClaimBuilder;

/// What the OCR service does for a given file.
#[derive(Debug, Clone)]
pub enum Script {
    Date(&'static str),
    NoDate,
    Fail,
    Hang,
    Panic,
}

#[derive(Default)]
pub struct ScriptedOcr {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedOcr {
    pub fn set(&self, file_name: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .insert(file_name.to_string(), script);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// File names the service was asked about, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentOcr for ScriptedOcr {
    async fn process_document(&self, path: &Path) -> Result<OcrResponse, ExtractError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push(name.clone());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .unwrap_or(Script::NoDate);

        match script {
            Script::Date(date) => Ok(OcrResponse::with_date(date)),
            Script::NoDate => Ok(OcrResponse::default()),
            Script::Fail => Err(ExtractError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            }),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(OcrResponse::default())
            }
            Script::Panic => panic!("scripted OCR panic for {}", name),
        }
    }
}

/// Claim store wrapper that can be told to fail.
pub struct FlakyStore {
    inner: Arc<Database>,
    failing_updates: AtomicUsize,
    reads_down: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<Database>) -> Self {
        Self {
            inner,
            failing_updates: AtomicUsize::new(0),
            reads_down: AtomicBool::new(false),
        }
    }

    /// The next `count` calls to `update` fail.
    pub fn fail_next_updates(&self, count: usize) {
        self.failing_updates.store(count, Ordering::SeqCst);
    }

    /// Every query fails until switched back.
    pub fn set_reads_down(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    fn offline() -> DatabaseError {
        DatabaseError::Io {
            path: PathBuf::from("claims.db"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "store offline"),
        }
    }

    fn check_reads(&self) -> Result<(), DatabaseError> {
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(Self::offline());
        }
        Ok(())
    }
}

impl ClaimStore for FlakyStore {
    fn create_pending_claim(&self, claim: &NewClaim) -> Result<Claim, DatabaseError> {
        self.inner.create_pending_claim(claim)
    }

    fn find_by_id(&self, id: ClaimId) -> Result<Option<Claim>, DatabaseError> {
        self.check_reads()?;
        self.inner.find_by_id(id)
    }

    fn find_all_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, DatabaseError> {
        self.check_reads()?;
        self.inner.find_all_by_status(status)
    }

    fn find_all(&self) -> Result<Vec<Claim>, DatabaseError> {
        self.check_reads()?;
        self.inner.find_all()
    }

    fn update(&self, id: ClaimId, update: &ClaimUpdate) -> Result<(), DatabaseError> {
        let remaining = self.failing_updates.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_updates.store(remaining - 1, Ordering::SeqCst);
            return Err(Self::offline());
        }
        self.inner.update(id, update)
    }
}

pub struct TestHarness {
    temp_dir: TempDir,
    pub upload_dir: PathBuf,
    pub db: Arc<Database>,
    pub store: Arc<FlakyStore>,
    pub ocr: Arc<ScriptedOcr>,
    pub config: PipelineConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let upload_dir = temp_dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("Failed to create upload dir");

        let db = Arc::new(Database::open_in_memory().expect("Failed to open database"));
        let store = Arc::new(FlakyStore::new(db.clone()));

        let config = PipelineConfig {
            window_days: 21,
            upload_directory: upload_dir.clone(),
            ocr_timeout: Duration::from_millis(200),
        };

        Self {
            temp_dir,
            upload_dir,
            db,
            store,
            ocr: Arc::new(ScriptedOcr::default()),
            config,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(&self.config, self.ocr.clone(), self.store.clone())
    }

    pub fn submission_processor(&self) -> SubmissionProcessor {
        SubmissionProcessor::new(self.pipeline())
    }

    pub fn worker(&self) -> ReconciliationWorker {
        ReconciliationWorker::new(
            self.pipeline(),
            Arc::new(UploadDirectory::new(&self.upload_dir)),
        )
    }

    /// Writes a fake invoice into the upload directory.
    pub fn write_upload(&self, name: &str) -> PathBuf {
        let path = self.upload_dir.join(name);
        std::fs::write(&path, b"%PDF-1.4 test invoice").expect("Failed to write upload");
        path
    }

    /// Writes the upload and stores a pending claim for it.
    pub fn pending_claim(&self, name: &str, installation_date: NaiveDate) -> Claim {
        self.write_upload(name);
        let new_claim = ClaimBuilder::new()
            .installed_on(installation_date)
            .build(&self.upload_dir, name);
        self.db
            .create_pending_claim(&new_claim)
            .expect("Failed to create claim")
    }

    pub fn claim(&self, id: ClaimId) -> Claim {
        self.db
            .find_by_id(id)
            .expect("Failed to read claim")
            .expect("Claim not found")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
