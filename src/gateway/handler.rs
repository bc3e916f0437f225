use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use super::error::GatewayError;
use super::payload::{EvalRequest, EvalResponse, JudgeRequest, ProbRequest, ProbResponse};
use super::state::HandlerState;
use super::status::{JUDGE_STATUS_HEADER, JudgeStatus};
use crate::prompt::{assessor_prompt, pair_prompt};
use crate::scoring::ScoreOutcome;

/// `POST /eval`: scores a query/document pair with the seq2seq backend.
#[instrument(skip(state, payload))]
pub async fn eval_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request: EvalRequest = parse_request(payload)?;
    let scorer = state.pair_scorer()?;

    debug!(
        query_len = request.query.len(),
        document_len = request.document.len(),
        "Scoring pair"
    );

    let prompt = pair_prompt(&request.query, &request.document);
    let outcome = scorer.score(&prompt).await?;

    Ok(make_response(&outcome, EvalResponse::from(&outcome.result)))
}

/// `POST /prob`: scores a ready-made prompt with the chat backend.
#[instrument(skip(state, payload))]
pub async fn prob_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request: ProbRequest = parse_request(payload)?;
    let scorer = state.chat_scorer()?;

    debug!(prompt_len = request.prompt.len(), "Scoring prompt");

    let outcome = scorer.score(&request.prompt).await?;

    Ok(make_response(&outcome, ProbResponse::from(&outcome.result)))
}

/// `POST /judge`: builds the assessor prompt and scores it with the chat backend.
#[instrument(skip(state, payload))]
pub async fn judge_handler(
    State(state): State<HandlerState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let request: JudgeRequest = parse_request(payload)?;
    let scorer = state.chat_scorer()?;

    let prompt = assessor_prompt(
        &request.query,
        request.narrative.as_deref(),
        &request.document,
    );
    let outcome = scorer.score(&prompt).await?;

    Ok(make_response(&outcome, ProbResponse::from(&outcome.result)))
}

pub(crate) fn parse_request<T: DeserializeOwned>(
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<T, GatewayError> {
    let Json(value) = payload.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;

    serde_json::from_value(value)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))
}

pub(crate) fn make_response<T: Serialize>(outcome: &ScoreOutcome, body: T) -> Response {
    let status = JudgeStatus::from_outcome(outcome);

    let mut headers = HeaderMap::new();
    headers.insert(
        JUDGE_STATUS_HEADER,
        HeaderValue::from_static(status.as_header_value()),
    );
    if let Ok(value) = HeaderValue::from_str(&outcome.request_id.to_string()) {
        headers.insert("x-request-id", value);
    }

    (StatusCode::OK, headers, Json(body)).into_response()
}
