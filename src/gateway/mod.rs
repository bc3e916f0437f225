//! HTTP gateway (Axum) for relevance scoring.
//!
//! Routes:
//! - `POST /eval` `{query, document}` → seq2seq pair score
//! - `POST /prob` `{prompt}` → chat logprob score
//! - `POST /judge` `{query, narrative?, document}` → chat logprob score over the assessor prompt
//! - `GET /healthz`, `GET /ready`
//!
//! Every response carries an [`JUDGE_STATUS_HEADER`] value.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;
pub mod status;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{eval_handler, judge_handler, prob_handler};
pub use payload::{EvalRequest, EvalResponse, JudgeRequest, ProbRequest, ProbResponse};
pub use state::HandlerState;
pub use status::{
    JUDGE_STATUS_DISABLED, JUDGE_STATUS_HEADER, JUDGE_STATUS_HEALTHY, JUDGE_STATUS_READY,
    JUDGE_STATUS_UNAVAILABLE, JudgeStatus,
};

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/eval", post(eval_handler))
        .route("/prob", post(prob_handler))
        .route("/judge", post(judge_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub monot5: &'static str,
    pub chat: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        JUDGE_STATUS_HEADER,
        HeaderValue::from_static(JUDGE_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// Ready once at least one backend is loaded.
#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<HandlerState>) -> Response {
    let backend_status = |loaded: bool| {
        if loaded {
            JUDGE_STATUS_READY
        } else {
            JUDGE_STATUS_DISABLED
        }
    };

    let components = ComponentStatus {
        http: JUDGE_STATUS_READY,
        monot5: backend_status(state.pair.is_some()),
        chat: backend_status(state.chat.is_some()),
    };

    let is_ready = state.has_backend();

    let (status_code, status_msg, header) = if is_ready {
        (StatusCode::OK, "ok", JUDGE_STATUS_READY)
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            JUDGE_STATUS_UNAVAILABLE,
        )
    };

    let mut headers = HeaderMap::new();
    headers.insert(JUDGE_STATUS_HEADER, HeaderValue::from_static(header));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
