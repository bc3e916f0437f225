use std::path::PathBuf;
use thiserror::Error;

/// Failures of the model/runtime call itself.
///
/// These are never folded into a fallback result; they surface as service-level errors.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load model: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("invalid inference configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("request to inference runtime failed: {reason}")]
    RequestFailed { reason: String },

    #[error("inference runtime returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("malformed inference response: {reason}")]
    MalformedResponse { reason: String },
}

impl InferenceError {
    /// Short machine-readable kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::ModelNotFound { .. } => "model_not_found",
            InferenceError::ModelLoadFailed { .. } => "model_load_failed",
            InferenceError::InferenceFailed { .. } => "inference_failed",
            InferenceError::TokenizationFailed { .. } => "tokenization_failed",
            InferenceError::InvalidConfig { .. } => "invalid_config",
            InferenceError::RequestFailed { .. } => "request_failed",
            InferenceError::UpstreamStatus { .. } => "upstream_status",
            InferenceError::MalformedResponse { .. } => "malformed_response",
        }
    }
}

impl From<candle_core::Error> for InferenceError {
    fn from(err: candle_core::Error) -> Self {
        InferenceError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for InferenceError {
    fn from(err: std::io::Error) -> Self {
        InferenceError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        let reason = if err.is_timeout() {
            format!("timed out: {}", err)
        } else {
            err.to_string()
        };
        InferenceError::RequestFailed { reason }
    }
}
