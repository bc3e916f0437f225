//! Relevance scoring pipeline.
//!
//! [`RelevanceScorer`] owns one inference invoker and runs a prompt through it:
//!
//! 1. optional token-budget truncation ([`PromptTruncator`](crate::prompt::PromptTruncator));
//! 2. result-cache lookup keyed by the BLAKE3 hash of the final prompt;
//! 3. generation, where an [`InferenceError`](crate::inference::InferenceError) aborts with
//!    [`ScoringError`];
//! 4. decision location and probability extraction, where any extraction problem yields a
//!    neutral fallback [`RelevanceResult`] instead of an error.
//!
//! Failed inference is never cached.

pub mod cache;
pub mod error;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use cache::{ResultCache, hash_prompt};
pub use error::ScoringError;
pub use scorer::{RelevanceScorer, evaluate_trace};
pub use types::{RelevanceResult, ResultSource, ScoreOutcome};
