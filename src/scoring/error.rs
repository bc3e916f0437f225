use thiserror::Error;

use crate::inference::InferenceError;

/// Failures that abort scoring. Extraction problems are not errors here; they become
/// fallback results.
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
}

impl ScoringError {
    pub fn kind(&self) -> &'static str {
        match self {
            ScoringError::Inference(err) => err.kind(),
        }
    }
}
