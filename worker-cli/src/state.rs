use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use warranty::config::load_config_or_default;
use warranty::extractor::{DocumentOcr, VeryfiClient, VeryfiCredentials};
use warranty::pipeline::{Pipeline, PipelineConfig};
use warranty::storage::UploadDirectory;
use warranty::{Config, Database};

/// Everything a command needs, built from the loaded config.
pub struct AppState {
    pub config: Config,
    pub pipeline_config: PipelineConfig,
    pub uploads: UploadDirectory,
}

impl AppState {
    pub fn load(path: Option<&Path>) -> warranty::Result<Self> {
        let config = load_config_or_default(path)?;
        let pipeline_config = PipelineConfig::from_config(&config);
        let uploads = UploadDirectory::new(&pipeline_config.upload_directory);

        Ok(Self {
            config,
            pipeline_config,
            uploads,
        })
    }

    pub fn open_store(&self) -> warranty::Result<Arc<Database>> {
        let db = Database::open(&self.config.database_path())?;
        Ok(Arc::new(db))
    }

    pub fn ocr_client(&self) -> anyhow::Result<Arc<dyn DocumentOcr>> {
        let ocr = &self.config.ocr;
        let api_key = ocr
            .api_key_source()
            .resolve()
            .context("OCR API key is not configured")?;

        let client = VeryfiClient::new(
            &ocr.endpoint,
            VeryfiCredentials {
                client_id: ocr.client_id.clone(),
                username: ocr.username.clone(),
                api_key,
            },
            Duration::from_secs(ocr.timeout_secs),
        )?;
        Ok(Arc::new(client))
    }

    pub fn pipeline(&self, store: Arc<Database>) -> anyhow::Result<Pipeline> {
        Ok(Pipeline::new(&self.pipeline_config, self.ocr_client()?, store))
    }
}
