//! Calibrated true/false relevance judgments from language-model scores.
//!
//! A relevance model is asked whether a document answers a query. Instead of trusting the
//! generated word, the service reads the model's scores for the `true` and `false` labels at
//! the position where it commits to an answer and normalizes them into `P(true)`/`P(false)`.
//!
//! ## Modules
//! - [`prompt`] - prompt templates and token-budget truncation
//! - [`inference`] - model/runtime invokers ([`MonoT5Invoker`], [`ChatLogprobInvoker`])
//! - [`decision`] - decision-position location and two-way softmax
//! - [`scoring`] - the pipeline tying them together, with a result cache
//! - [`gateway`] - Axum HTTP surface
//! - [`config`] - environment-backed configuration
//!
//! ## Test/Mock Support
//! [`MockInvoker`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod decision;
pub mod gateway;
pub mod inference;
pub mod prompt;
pub mod scoring;

pub use config::{Config, ConfigError};
pub use decision::{
    DecisionOutcome, DecisionScores, DecisionStrategy, ExtractionError, GenerationTrace,
    MissingToken, Probabilities, ScoreDistribution, ScoreEntry, ScoreScale, TokenMatcher,
    extract_probabilities, locate, scores_at,
};
pub use gateway::{
    HandlerState, JUDGE_STATUS_HEADER, JudgeStatus, create_router_with_state,
};
#[cfg(any(test, feature = "mock"))]
pub use inference::MockInvoker;
pub use inference::{
    ChatConfig, ChatLogprobInvoker, DevicePreference, GenerationRequest, HfTokenizer,
    InferenceError, InferenceInvoker, MonoT5Config, MonoT5Invoker, OutputConstraint,
    TextTokenizer,
};
pub use prompt::{PromptTruncator, Truncated, assessor_prompt, normalize_document, pair_prompt};
pub use scoring::{
    RelevanceResult, RelevanceScorer, ResultCache, ResultSource, ScoreOutcome, ScoringError,
};
