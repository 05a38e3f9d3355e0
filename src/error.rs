use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndarray::ShapeError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing field '{0}' in task")]
    MissingField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("No demographics for zipcode {0}, prediction is undefined")]
    LookupDegraded(String),

    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("Unsupported model artifact: {0}")]
    UnsupportedModel(String),

    #[error("Failed to read model {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("Data file unavailable: {path}: {reason}")]
    DataUnavailable { path: String, reason: String },

    #[error("Malformed data in {path}: {reason}")]
    MalformedData { path: String, reason: String },

    #[cfg(feature = "onnx")]
    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Input shape mismatch: expected {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Feature mismatch: model expects {expected:?}, got {got:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),
}

/// Closed classification of [`InferenceError`] exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ValidationError,
    LookupDegraded,
    ArtifactUnavailable,
    PredictionFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::LookupDegraded => "lookup_degraded",
            ErrorKind::ArtifactUnavailable => "artifact_unavailable",
            ErrorKind::PredictionFailure => "prediction_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::LookupDegraded => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ArtifactUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::PredictionFailure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::InvalidRequest(_)
            | InferenceError::MissingField(_)
            | InferenceError::InvalidField { .. } => ErrorKind::ValidationError,
            InferenceError::LookupDegraded(_) => ErrorKind::LookupDegraded,
            InferenceError::ModelNotFound(_)
            | InferenceError::UnsupportedModel(_)
            | InferenceError::ModelLoad { .. }
            | InferenceError::DataUnavailable { .. }
            | InferenceError::MalformedData { .. } => ErrorKind::ArtifactUnavailable,
            #[cfg(feature = "onnx")]
            InferenceError::OrtError(_) => ErrorKind::PredictionFailure,
            InferenceError::ShapeMismatch { .. }
            | InferenceError::FeatureMismatch { .. }
            | InferenceError::PredictionFailed(_)
            | InferenceError::ShapeError(_) => ErrorKind::PredictionFailure,
        }
    }
}

impl IntoResponse for InferenceError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let body = Json(json!({
            "error": self.to_string(),
            "kind": kind.as_str(),
        }));

        (kind.status(), body).into_response()
    }
}
