//! True/false decision extraction from a model's score distributions.
//!
//! Given a [`GenerationTrace`], [`locate`] finds the position at which the model committed to a
//! relevance decision and [`scores_at`] turns the label scores at that position into calibrated
//! probabilities with [`extract_probabilities`].
//!
//! # Strategies
//!
//! - [`DecisionStrategy::FirstToken`]: a seq2seq relevance model emits the label as its first
//!   token. Labels are matched by vocabulary id.
//! - [`DecisionStrategy::RankedScan`]: a chat model emits structured JSON such as
//!   `{"relevance": true}`. The first position whose rank-1 token is exactly `true` or `false`
//!   is the decision; labels there are matched by substring.
//!
//! # Failure policy
//!
//! [`ExtractionError`] covers the recoverable cases (no decision position, label absent from
//! the returned top-K, NaN score). Callers answer those with the neutral `0.5 / 0.5` outcome.
//! Both labels at zero probability is a valid neutral outcome rather than an error.

pub mod error;
pub mod extractor;
pub mod locator;
pub mod types;


pub use error::{ExtractionError, MissingToken};
pub use extractor::{extract_probabilities, partial_scores, scores_at};
pub use locator::{FALSE_LABEL, TRUE_LABEL, locate};
pub use types::{
    DecisionOutcome, DecisionScores, DecisionStrategy, GenerationTrace, Probabilities,
    ScoreDistribution, ScoreEntry, ScoreScale, TokenMatcher,
};
