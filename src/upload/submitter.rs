use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::mpsc::Sender;
use tracing::{debug, info};

use crate::analysis::AnalysisResult;
use crate::error::UploadError;
use crate::upload::types::{RecordId, UploadEvent};
use crate::upload::validator::AcceptedFile;

pub const ANALYZE_DOCUMENT_PATH: &str = "/analyze/document";
pub const HEALTH_PATH: &str = "/health";

/// Lets a running submission report that the service has started answering.
#[derive(Clone)]
pub struct StageReporter {
    id: RecordId,
    sender: Option<Sender<UploadEvent>>,
}

impl StageReporter {
    pub fn new(id: RecordId, sender: Sender<UploadEvent>) -> Self {
        Self {
            id,
            sender: Some(sender),
        }
    }

    /// A reporter that goes nowhere, for one-off submissions.
    pub fn detached(id: RecordId) -> Self {
        Self { id, sender: None }
    }

    pub fn processing(&self) {
        if let Some(sender) = &self.sender {
            sender
                .send(UploadEvent::Processing(self.id))
                .unwrap_or_default();
        }
    }
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Sends one document for analysis. `Ok(None)` means the service answered
    /// without a result payload.
    async fn analyze(
        &self,
        file: &AcceptedFile,
        stage: StageReporter,
    ) -> Result<Option<AnalysisResult>, UploadError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Clone)]
pub struct HttpAnalysisService {
    client: Client,
    base_url: String,
}

impl HttpAnalysisService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthStatus, UploadError> {
        let response = self.client.get(self.endpoint(HEALTH_PATH)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UploadFailed(status_text(status)));
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(
        &self,
        file: &AcceptedFile,
        stage: StageReporter,
    ) -> Result<Option<AnalysisResult>, UploadError> {
        let content = tokio::fs::read(file.path())
            .await
            .map_err(|source| UploadError::Read {
                path: file.path().display().to_string(),
                source,
            })?;

        let part = Part::bytes(content)
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())?;
        let form = Form::new().part("file", part);

        let url = self.endpoint(ANALYZE_DOCUMENT_PATH);
        debug!("Sending {} ({} bytes) to {}", file.name(), file.size_bytes(), url);

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::UploadFailed(status_text(status)));
        }

        stage.processing();
        info!("Analysis service accepted {}, reading results", file.name());

        let body = response.bytes().await?;
        interpret_response(&body)
    }
}

/// Extracts the `results` payload from an analysis response body.
pub fn interpret_response(body: &[u8]) -> Result<Option<AnalysisResult>, UploadError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| UploadError::InvalidResponse(e.to_string()))?;

    let Value::Object(mut envelope) = value else {
        debug!("Analysis response is not an object, nothing to propagate");
        return Ok(None);
    };

    if envelope.get("status").and_then(Value::as_str) == Some("error") {
        let message = envelope
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or("no details given")
            .to_string();
        return Err(UploadError::Rejected(message));
    }

    match envelope.remove("results") {
        Some(Value::Null) | None => Ok(None),
        Some(results) => Ok(Some(AnalysisResult::new(results))),
    }
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
