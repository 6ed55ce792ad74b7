use crate::{
    classifier::{ClassifierError, ImageUpload},
    server::SharedState,
    telemetry::Outcome,
};
use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Instant;
use thiserror::Error;
use tokio::time::timeout;
use tracing::instrument;

pub const IMAGE_FIELD: &str = "image";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("No image uploaded")]
    MissingImage,
    #[error("No image uploaded")]
    EmptyImage,
    #[error("Expected a multipart/form-data body: {0}")]
    NotMultipart(String),
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to read multipart body: {}", .0.body_text())]
    Multipart(#[from] MultipartError),
    #[error("Prediction failed: {0}")]
    Classifier(#[from] ClassifierError),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictError::Multipart(err) => err.status(),
            PredictError::Classifier(ClassifierError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            PredictError::Classifier(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn outcome(&self) -> Outcome {
        match self {
            PredictError::Classifier(_) => Outcome::ClassifierError,
            _ => Outcome::ValidationError,
        }
    }
}

impl From<MultipartRejection> for PredictError {
    fn from(rejection: MultipartRejection) -> Self {
        PredictError::Validation(ValidationError::NotMultipart(rejection.body_text()))
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[instrument(skip(state, multipart))]
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, PredictError> {
    let result = predict_label(&state, multipart).await;

    match &result {
        Ok(label) => {
            tracing::info!("Predicted label {}", label);
            state.metrics.record_request(Outcome::Success);
        }
        Err(err) => {
            match err {
                PredictError::Classifier(_) => tracing::error!("Classification failed: {}", err),
                _ => tracing::warn!("Rejected prediction request: {}", err),
            }
            state.metrics.record_request(err.outcome());
        }
    }

    result
}

async fn predict_label(
    state: &SharedState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, PredictError> {
    let upload = read_image(multipart?).await?;

    tracing::debug!(
        "Classifying {} bytes of {} (file name: {:?})",
        upload.len(),
        upload.content_type,
        upload.file_name
    );

    let started = Instant::now();
    let result = timeout(state.classifier_timeout, state.classifier.classify(upload)).await;
    state
        .metrics
        .record_classification_duration(started.elapsed().as_secs_f64());

    let label = result.map_err(|_| ClassifierError::Timeout(state.classifier_timeout))??;

    Ok(label)
}

/// Returns the first `image` part; other parts are skipped.
async fn read_image(mut multipart: Multipart) -> Result<ImageUpload, PredictError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await?;

        let upload = ImageUpload::new(data, content_type, file_name);
        if upload.is_empty() {
            return Err(ValidationError::EmptyImage.into());
        }
        return Ok(upload);
    }

    Err(ValidationError::MissingImage.into())
}
