//! OpenAI-compatible chat runtime with log-probabilities.
//!
//! Targets vLLM's `/v1/chat/completions`: greedy decoding, JSON-schema constrained output and
//! `top_logprobs` per generated position. The response is parsed with `async-openai` chat types
//! and converted into a rank-ordered [`GenerationTrace`] on the log-probability scale.

pub mod config;

#[cfg(test)]
mod tests;

pub use config::{
    ChatConfig, DEFAULT_CHAT_MODEL, DEFAULT_MAX_NEW_TOKENS, DEFAULT_MAX_PROMPT_TOKENS,
    DEFAULT_SYSTEM_PROMPT, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_LOGPROBS,
};

use async_openai::types::chat::CreateChatCompletionResponse;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::error::InferenceError;
use super::{GenerationRequest, InferenceInvoker, OutputConstraint};
use crate::decision::{DecisionStrategy, GenerationTrace, ScoreDistribution, ScoreScale};

const MAX_ERROR_BODY_CHARS: usize = 512;

pub struct ChatLogprobInvoker {
    client: reqwest::Client,
    endpoint: String,
    config: ChatConfig,
}

impl std::fmt::Debug for ChatLogprobInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLogprobInvoker")
            .field("endpoint", &self.endpoint)
            .field("model", &self.config.model)
            .field("top_logprobs", &self.config.top_logprobs)
            .finish()
    }
}

impl ChatLogprobInvoker {
    pub fn new(config: ChatConfig) -> Result<Self, InferenceError> {
        if let Err(msg) = config.validate() {
            return Err(InferenceError::InvalidConfig { reason: msg });
        }

        let endpoint = config
            .completions_url()
            .ok_or_else(|| InferenceError::InvalidConfig {
                reason: "chat runtime URL is not configured".to_string(),
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        debug!(endpoint = %endpoint, model = %config.model, "Chat runtime client ready");

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub(crate) fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user", "content": request.prompt },
            ],
            "temperature": 0.0,
            "max_tokens": request.max_new_tokens,
            "logprobs": true,
            "top_logprobs": self.config.top_logprobs,
        });

        if let Some(OutputConstraint::JsonSchema { name, schema }) = &request.constraint {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": { "name": name, "schema": schema, "strict": true }
            });
        }

        body
    }
}

#[async_trait]
impl InferenceInvoker for ChatLogprobInvoker {
    fn name(&self) -> &str {
        "chat"
    }

    fn strategy(&self) -> DecisionStrategy {
        DecisionStrategy::RankedScan
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationTrace, InferenceError> {
        let body = self.request_body(request);

        let mut http_request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref key) = self.config.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            warn!(status = status.as_u16(), body = %body, "Chat runtime returned an error");
            return Err(InferenceError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CreateChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| InferenceError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        trace_from_completion(&completion)
    }
}

/// Converts the first choice's per-position `top_logprobs` into a [`GenerationTrace`].
pub fn trace_from_completion(
    completion: &CreateChatCompletionResponse,
) -> Result<GenerationTrace, InferenceError> {
    let choice = completion
        .choices
        .first()
        .ok_or_else(|| InferenceError::MalformedResponse {
            reason: "response has no choices".to_string(),
        })?;

    let content = choice
        .logprobs
        .as_ref()
        .and_then(|logprobs| logprobs.content.as_ref())
        .ok_or_else(|| InferenceError::MalformedResponse {
            reason: "response carries no token logprobs".to_string(),
        })?;

    let positions: Vec<ScoreDistribution> = content
        .iter()
        .map(|position| {
            if position.top_logprobs.is_empty() {
                ScoreDistribution::ranked([(
                    None,
                    position.token.as_str(),
                    f64::from(position.logprob),
                )])
            } else {
                ScoreDistribution::ranked(
                    position
                        .top_logprobs
                        .iter()
                        .map(|top| (None, top.token.as_str(), f64::from(top.logprob))),
                )
            }
        })
        .collect();

    let tokens: Vec<String> = content.iter().map(|p| p.token.clone()).collect();

    debug!(
        positions = positions.len(),
        text = %tokens.concat(),
        "Parsed chat completion logprobs"
    );

    Ok(GenerationTrace::new(positions, tokens, ScoreScale::LogProb))
}
