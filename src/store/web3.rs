//! web3.storage upload client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

use super::ContentStore;
use super::error::UploadError;
use super::local::REPORT_FILENAME;

pub const DEFAULT_UPLOAD_URL: &str = "https://api.web3.storage/upload";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: Option<String>,
}

/// Posts the artifact and `report.json` as one multipart request and returns
/// the `cid` from the JSON response.
pub struct Web3StorageStore {
    http: HttpClient,
    url: String,
    token: String,
}

impl std::fmt::Debug for Web3StorageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3StorageStore")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Web3StorageStore {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: HttpClient::builder()
                .timeout(UPLOAD_TIMEOUT)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            url: url.into(),
            token: token.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn form(filename: &str, primary: Vec<u8>, report: Vec<u8>) -> Result<Form, UploadError> {
        let file = Part::bytes(primary)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(upload_failed)?;
        let report = Part::bytes(report)
            .file_name(REPORT_FILENAME)
            .mime_str("application/json")
            .map_err(upload_failed)?;
        Ok(Form::new().part("file", file).part("file", report))
    }
}

fn upload_failed(e: reqwest::Error) -> UploadError {
    UploadError::UploadFailed {
        reason: e.to_string(),
    }
}

#[async_trait]
impl ContentStore for Web3StorageStore {
    async fn put(
        &self,
        filename: &str,
        primary: Vec<u8>,
        report: Vec<u8>,
    ) -> Result<String, UploadError> {
        let form = Self::form(filename, primary, report)?;

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await
            .map_err(upload_failed)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Content store rejected upload");
            return Err(UploadError::UploadFailed {
                reason: format!("{status} {body}"),
            });
        }

        let parsed: UploadResponse = resp.json().await.map_err(upload_failed)?;
        let cid = parsed
            .cid
            .filter(|cid| !cid.is_empty())
            .ok_or_else(|| UploadError::UploadFailed {
                reason: "response missing cid".to_string(),
            })?;

        debug!(content_id = %cid, "Uploaded to web3.storage");
        Ok(cid)
    }

    fn name(&self) -> &str {
        "web3.storage"
    }
}
