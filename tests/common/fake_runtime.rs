//! In-process stand-in for an OpenAI-compatible chat runtime.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use parking_lot::Mutex;

use super::harness::{ServerStartupError, TestServer, serve};

#[derive(Clone)]
pub struct FakeRuntime {
    reply: Arc<Mutex<(StatusCode, serde_json::Value)>>,
    requests: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl FakeRuntime {
    pub fn new(reply: serde_json::Value) -> Self {
        Self {
            reply: Arc::new(Mutex::new((StatusCode::OK, reply))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_reply(&self, status: StatusCode, reply: serde_json::Value) {
        *self.reply.lock() = (status, reply);
    }

    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.requests.lock().clone()
    }

    /// Serves `/v1/chat/completions`; the base URL to configure is `{url}/v1`.
    pub async fn spawn(&self) -> Result<TestServer, ServerStartupError> {
        let app = Router::new()
            .route("/v1/chat/completions", post(completions))
            .with_state(self.clone());
        serve(app).await
    }
}

async fn completions(
    State(runtime): State<FakeRuntime>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    runtime.requests.lock().push(body);
    let (status, reply) = runtime.reply.lock().clone();
    (status, Json(reply)).into_response()
}

/// Top-K entry for [`completion`].
pub fn position(token: &str, top: &[(&str, f32)]) -> serde_json::Value {
    let logprob = top
        .iter()
        .find(|(t, _)| *t == token)
        .map(|(_, lp)| *lp)
        .unwrap_or(-0.01);
    let top: Vec<serde_json::Value> = top
        .iter()
        .map(|(t, lp)| serde_json::json!({ "token": t, "logprob": lp, "bytes": null }))
        .collect();
    serde_json::json!({ "token": token, "logprob": logprob, "bytes": null, "top_logprobs": top })
}

/// A chat completion whose first choice carries `content` as its token logprobs.
pub fn completion(content: Vec<serde_json::Value>) -> serde_json::Value {
    let text: String = content
        .iter()
        .filter_map(|p| p["token"].as_str())
        .collect();

    serde_json::json!({
        "id": "chatcmpl-fake",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": "meta-llama/Llama-3.1-8B-Instruct",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop",
            "logprobs": { "content": content }
        }]
    })
}

/// `{"relevance": <label>}` with both labels in the top-K at the value position.
pub fn relevance_completion(logprob_true: f32, logprob_false: f32) -> serde_json::Value {
    let label = if logprob_true >= logprob_false {
        " true"
    } else {
        " false"
    };

    completion(vec![
        position("{\"", &[("{\"", -0.0001), ("{", -9.2)]),
        position("relevance", &[("relevance", -0.0001)]),
        position("\":", &[("\":", -0.0002)]),
        position(
            label,
            &[(" true", logprob_true), (" false", logprob_false), (" tr", -11.0)],
        ),
        position("}", &[("}", -0.0001)]),
    ])
}
