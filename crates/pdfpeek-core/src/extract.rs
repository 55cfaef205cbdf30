//! Client for the remote text-extraction endpoint.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

use crate::PDF_MIME;

/// Message used when the server fails without an `error` field.
pub const GENERIC_FAILURE: &str = "Failed to extract text";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Io(String),
    #[error("network error: {0}")]
    Http(String),
    /// Non-2xx status or an `error` field in the response body.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// Authoritative page count reported by the server.
    pub page_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    metadata: Option<ResponseMetadata>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    pages: Option<u32>,
}

/// Anything that can turn a PDF on disk into text.
pub trait TextExtractor: Send + Sync {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Extraction, ExtractError>> + Send + 'a>>;
}

/// Uploads files as multipart form data to a fixed endpoint.
pub struct ExtractionClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl ExtractionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn upload(&self, path: &Path) -> Result<Extraction, ExtractError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExtractError::Io(e.to_string()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.pdf".to_string());

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(PDF_MIME)
            .map_err(|e| ExtractError::Http(format!("mime: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(endpoint = %self.endpoint, file = %file_name, "uploading for extraction");

        let resp = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ExtractError::Http(e.to_string()))?;

        parse_response(status.as_u16(), &body)
    }
}

impl TextExtractor for ExtractionClient {
    fn extract<'a>(
        &'a self,
        path: &'a Path,
    ) -> Pin<Box<dyn Future<Output = Result<Extraction, ExtractError>> + Send + 'a>> {
        Box::pin(self.upload(path))
    }
}

/// Interpret the endpoint's status and body.
pub fn parse_response(status: u16, body: &str) -> Result<Extraction, ExtractError> {
    let success = (200..300).contains(&status);
    let parsed: Result<ExtractResponse, _> = serde_json::from_str(body);

    if !success {
        let message = parsed
            .ok()
            .and_then(|r| r.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        return Err(ExtractError::Server { status, message });
    }

    let data = parsed.map_err(|e| ExtractError::Decode(e.to_string()))?;
    if let Some(message) = data.error {
        return Err(ExtractError::Server { status, message });
    }
    Ok(Extraction {
        text: data.text.unwrap_or_default(),
        page_count: data.metadata.and_then(|m| m.pages),
    })
}
