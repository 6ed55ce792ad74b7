use crate::config::ClassifierConfig;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header, Client};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Classifier did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
    #[error("Classifier returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("Failed to build classifier client: {0}")]
    Client(reqwest::Error),
}

/// A single uploaded image, alive for the duration of one request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImageUpload {
    pub fn new(data: Bytes, content_type: Option<String>, file_name: Option<String>) -> Self {
        Self {
            data,
            content_type: content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            file_name,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
pub trait Classifier: Send + Sync + 'static {
    async fn classify(&self, image: ImageUpload) -> Result<String, ClassifierError>;
}

#[derive(Deserialize)]
struct ScoringResponse {
    label: String,
}

/// Forwards images to a remote scoring endpoint and reads a `{"label": ...}` JSON answer.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let timeout = config.get_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClassifierError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> ClassifierError {
        if err.is_timeout() {
            ClassifierError::Timeout(self.timeout)
        } else {
            ClassifierError::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    #[instrument(skip(self, image), fields(endpoint = %self.endpoint, size = image.len()))]
    async fn classify(&self, image: ImageUpload) -> Result<String, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, image.content_type)
            .body(image.data);

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Unavailable(format!(
                "scoring endpoint answered with status {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let scoring: ScoringResponse = serde_json::from_slice(&body)
            .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

        let label = scoring.label.trim();
        if label.is_empty() {
            return Err(ClassifierError::MalformedResponse(
                "label is empty".to_string(),
            ));
        }

        tracing::debug!("Scoring endpoint predicted {}", label);

        Ok(label.to_string())
    }
}
