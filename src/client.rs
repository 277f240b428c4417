use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::models::StatisticsPayload;

/// Multipart field the statistics service reads the export from.
pub const UPLOAD_FIELD: &str = "wrappedUpload";

/// Snapshot of the file to submit, taken before the request starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl LibraryUpload {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read library export: {}", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { filename, bytes })
    }
}

#[async_trait]
pub trait StatsTransport: Send + Sync {
    /// Send one upload and decode the service's answer. Never retries.
    async fn upload(&self, upload: LibraryUpload) -> Result<StatisticsPayload, TransportError>;
}

/// Posts the export as multipart form data to the service root.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint: format!("{}/", config.server_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatsTransport for HttpTransport {
    async fn upload(&self, upload: LibraryUpload) -> Result<StatisticsPayload, TransportError> {
        info!(
            endpoint = %self.endpoint,
            filename = %upload.filename,
            bytes = upload.bytes.len(),
            "uploading library export"
        );
        let part = Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str("application/xml")?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        // Failures come back as 4xx/5xx with a JSON body, so the status alone
        // decides nothing.
        let status = response.status();
        let body = response.bytes().await?;
        debug!(%status, len = body.len(), "response received");

        Ok(serde_json::from_slice(&body)?)
    }
}
