use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::decision::{GenerationTrace, locate, partial_scores, scores_at};
use crate::inference::{GenerationRequest, InferenceInvoker, OutputConstraint};
use crate::prompt::PromptTruncator;

use super::cache::{ResultCache, hash_prompt};
use super::error::ScoringError;
use super::types::{RelevanceResult, ResultSource, ScoreOutcome};

/// Prompt → invoker → decision → [`RelevanceResult`], with optional truncation and memoization.
pub struct RelevanceScorer {
    invoker: Arc<dyn InferenceInvoker>,
    max_new_tokens: usize,
    constraint: Option<OutputConstraint>,
    truncator: Option<PromptTruncator>,
    cache: Option<ResultCache>,
}

impl std::fmt::Debug for RelevanceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelevanceScorer")
            .field("invoker", &self.invoker.name())
            .field("strategy", &self.invoker.strategy().as_str())
            .field("max_new_tokens", &self.max_new_tokens)
            .field("truncator", &self.truncator)
            .field("cache", &self.cache)
            .finish()
    }
}

impl RelevanceScorer {
    pub fn new(invoker: Arc<dyn InferenceInvoker>, max_new_tokens: usize) -> Self {
        Self {
            invoker,
            max_new_tokens,
            constraint: None,
            truncator: None,
            cache: None,
        }
    }

    pub fn with_constraint(mut self, constraint: OutputConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn with_truncator(mut self, truncator: PromptTruncator) -> Self {
        self.truncator = Some(truncator);
        self
    }

    /// `0` disables caching.
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.cache = (capacity > 0).then(|| ResultCache::with_capacity(capacity));
        self
    }

    pub fn invoker_name(&self) -> &str {
        self.invoker.name()
    }

    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    pub async fn score(&self, prompt: &str) -> Result<ScoreOutcome, ScoringError> {
        let request_id = Uuid::new_v4();
        let invoker = self.invoker.name();

        let prompt = match &self.truncator {
            Some(truncator) => {
                let truncated = truncator.truncate(prompt)?;
                if truncated.was_truncated() {
                    info!(
                        %request_id,
                        original_tokens = truncated.original_tokens,
                        kept_tokens = truncated.kept_tokens,
                        "Prompt exceeded token budget"
                    );
                }
                truncated.text
            }
            None => prompt.to_string(),
        };

        let key = hash_prompt(&prompt);

        if let Some(cache) = &self.cache
            && let Some(result) = cache.get(&key)
        {
            debug!(%request_id, invoker, "Result cache hit");
            return Ok(ScoreOutcome {
                result,
                source: ResultSource::Cache,
                request_id,
            });
        }

        let mut request = GenerationRequest::new(prompt, self.max_new_tokens);
        if let Some(constraint) = &self.constraint {
            request = request.with_constraint(constraint.clone());
        }

        let trace = self.invoker.generate(&request).await.map_err(|e| {
            error!(%request_id, invoker, kind = e.kind(), error = %e, "Inference failed");
            ScoringError::from(e)
        })?;

        let result = self.evaluate(&trace);

        if let Some(ref err) = result.error {
            warn!(
                %request_id,
                invoker,
                prediction = %result.prediction,
                error = %err,
                "Falling back to neutral probabilities"
            );
        } else {
            debug!(
                %request_id,
                invoker,
                prediction = %result.prediction,
                prob_true = result.prob_true,
                "Scored prompt"
            );
        }

        if let Some(cache) = &self.cache {
            cache.insert(key, result.clone());
        }

        Ok(ScoreOutcome {
            result,
            source: ResultSource::Inference,
            request_id,
        })
    }

    /// Locates the decision in `trace` with this invoker's strategy and extracts the result.
    pub fn evaluate(&self, trace: &GenerationTrace) -> RelevanceResult {
        evaluate_trace(trace, &self.invoker.strategy())
    }
}

/// Pure trace → result step; extraction failures become fallback results.
pub fn evaluate_trace(
    trace: &GenerationTrace,
    strategy: &crate::decision::DecisionStrategy,
) -> RelevanceResult {
    let outcome = match locate(trace, strategy) {
        Ok(outcome) => outcome,
        Err(err) => {
            return RelevanceResult::fallback(trace.text().trim(), &err, None, None);
        }
    };

    let prediction = trace
        .token_at(outcome.position)
        .map(str::trim)
        .unwrap_or_default();

    match scores_at(trace, &outcome) {
        Ok(scores) => RelevanceResult::scored(prediction, &scores),
        Err(err) => {
            let (logit_true, logit_false) = partial_scores(trace, &outcome);
            RelevanceResult::fallback(prediction, &err, logit_true, logit_false)
        }
    }
}
