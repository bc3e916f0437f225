//! Inference invokers: the model/runtime collaborators behind relevance scoring.
//!
//! - [`monot5`] runs a seq2seq relevance model in-process with candle and reports the first
//!   decoder step's logits over the full vocabulary.
//! - [`chat`] calls an OpenAI-compatible runtime (vLLM) with constrained JSON output and reads
//!   back per-position top-K log-probabilities.
//! - [`MockInvoker`] replays scripted traces for tests.
//!
//! Every invoker converts its runtime's output into a typed
//! [`GenerationTrace`](crate::decision::GenerationTrace) at the boundary, so the decision
//! code never sees untyped data.

pub mod chat;
pub mod device;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod monot5;
pub mod tokenizer;

pub use chat::{ChatConfig, ChatLogprobInvoker};
pub use device::{DevicePreference, select_device};
pub use error::InferenceError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockInvoker;
pub use monot5::{MonoT5Config, MonoT5Invoker};
pub use tokenizer::{HfTokenizer, TextTokenizer};

use async_trait::async_trait;

use crate::decision::{DecisionStrategy, GenerationTrace};

/// Constraint applied to generation by the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputConstraint {
    /// Output must validate against this JSON schema.
    JsonSchema {
        name: String,
        schema: serde_json::Value,
    },
}

impl OutputConstraint {
    /// Schema for `{"relevance": true}` / `{"relevance": false}`.
    pub fn relevance_schema() -> Self {
        OutputConstraint::JsonSchema {
            name: "RelevanceCheck".to_string(),
            schema: serde_json::json!({
                "title": "RelevanceCheck",
                "type": "object",
                "properties": {
                    "relevance": {
                        "title": "Relevance",
                        "description": "Relevance. Boolean (true/false).",
                        "type": "boolean"
                    }
                },
                "required": ["relevance"]
            }),
        }
    }
}

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_new_tokens: usize,
    pub constraint: Option<OutputConstraint>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_new_tokens: usize) -> Self {
        Self {
            prompt: prompt.into(),
            max_new_tokens,
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: OutputConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }
}

/// A language-model runtime that produces per-position score distributions.
///
/// Implementations are loaded once and shared read-only across requests. A call either
/// returns a trace or an [`InferenceError`]; it never returns empty data in place of a failure.
#[async_trait]
pub trait InferenceInvoker: Send + Sync {
    /// Short name for logs and readiness reporting.
    fn name(&self) -> &str;

    /// How the decision position is found in this invoker's traces.
    fn strategy(&self) -> DecisionStrategy;

    /// Runs one generation.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationTrace, InferenceError>;
}
