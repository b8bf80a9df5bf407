//! HTTP client for the Veryfi document-processing API.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::ocr::{DocumentOcr, OcrResponse};
use crate::error::ExtractError;
use crate::sanitize;

pub const DEFAULT_ENDPOINT: &str = "https://api.veryfi.com";

const DOCUMENTS_PATH: &str = "/api/v8/partner/documents";

/// Account credentials for the Veryfi API.
#[derive(Clone)]
pub struct VeryfiCredentials {
    pub client_id: String,
    pub username: String,
    pub api_key: SecretString,
}

impl fmt::Debug for VeryfiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VeryfiCredentials")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("api_key", &"****")
            .finish()
    }
}

#[derive(Serialize)]
struct ProcessDocumentRequest<'a> {
    file_name: &'a str,
    file_data: String,
}

pub struct VeryfiClient {
    http: Client,
    endpoint: String,
    credentials: VeryfiCredentials,
}

impl VeryfiClient {
    /// `timeout` bounds each HTTP exchange; the extractor applies its own
    /// overall deadline on top.
    pub fn new(
        endpoint: &str,
        credentials: VeryfiCredentials,
        timeout: Duration,
    ) -> Result<Self, ExtractError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn documents_url(&self) -> String {
        format!("{}{}", self.endpoint, DOCUMENTS_PATH)
    }

    fn authorization(&self) -> String {
        format!(
            "apikey {}:{}",
            self.credentials.username,
            self.credentials.api_key.expose_secret()
        )
    }
}

#[async_trait]
impl DocumentOcr for VeryfiClient {
    async fn process_document(&self, path: &Path) -> Result<OcrResponse, ExtractError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExtractError::ReadDocument {
                path: path.to_path_buf(),
                source: e,
            })?;

        let file_name = sanitize::redact_path(path);
        let request = ProcessDocumentRequest {
            file_name: &file_name,
            file_data: STANDARD.encode(&bytes),
        };

        debug!(
            "Submitting {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            self.documents_url()
        );

        let response = self
            .http
            .post(self.documents_url())
            .header(ACCEPT, "application/json")
            .header("CLIENT-ID", &self.credentials.client_id)
            .header(AUTHORIZATION, self.authorization())
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Status {
                status: status.as_u16(),
                body: sanitize::truncate_body(&body),
            });
        }

        response
            .json::<OcrResponse>()
            .await
            .map_err(|e| ExtractError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> VeryfiCredentials {
        VeryfiCredentials {
            client_id: "client-1".to_string(),
            username: "installer-app".to_string(),
            api_key: SecretString::from("k3y".to_string()),
        }
    }

    #[test]
    fn test_documents_url_strips_trailing_slash() {
        let client =
            VeryfiClient::new("https://ocr.example.com/", credentials(), Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.documents_url(),
            "https://ocr.example.com/api/v8/partner/documents"
        );
    }

    #[test]
    fn test_authorization_header_format() {
        let client =
            VeryfiClient::new(DEFAULT_ENDPOINT, credentials(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.authorization(), "apikey installer-app:k3y");
    }

    #[test]
    fn test_credentials_debug_hides_api_key() {
        let debug = format!("{:?}", credentials());
        assert!(debug.contains("client-1"));
        assert!(!debug.contains("k3y"));
    }

    #[tokio::test]
    async fn test_unreadable_document_is_read_error() {
        let client =
            VeryfiClient::new(DEFAULT_ENDPOINT, credentials(), Duration::from_secs(5)).unwrap();
        let result = client
            .process_document(Path::new("/nonexistent/invoice.pdf"))
            .await;

        match result {
            Err(ExtractError::ReadDocument { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/invoice.pdf"));
            }
            other => panic!("Expected ReadDocument error, got {:?}", other),
        }
    }
}
