use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::status::{JUDGE_STATUS_HEADER, JUDGE_STATUS_UNAVAILABLE};
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0} backend is not configured")]
    BackendUnavailable(&'static str),

    #[error("scoring failed: {0}")]
    ScoringFailed(#[from] ScoringError),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, judge_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::BackendUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, JUDGE_STATUS_UNAVAILABLE)
            }
            GatewayError::ScoringFailed(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(JUDGE_STATUS_HEADER, HeaderValue::from_static(judge_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
