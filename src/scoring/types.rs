use crate::decision::{DecisionScores, ExtractionError, Probabilities};

/// Final relevance judgment for one prompt.
///
/// On extraction failure the probabilities are the neutral `0.5 / 0.5` and `error` explains why;
/// a confident score is never reported without both label scores.
#[derive(Debug, Clone, PartialEq)]
pub struct RelevanceResult {
    /// Trimmed decoded token at the decision position, or the trimmed output when none was found.
    pub prediction: String,
    pub logit_true: Option<f64>,
    pub logit_false: Option<f64>,
    pub prob_true: f64,
    pub prob_false: f64,
    pub error: Option<String>,
}

impl RelevanceResult {
    pub fn scored(prediction: impl Into<String>, scores: &DecisionScores) -> Self {
        Self {
            prediction: prediction.into(),
            logit_true: Some(scores.score_true),
            logit_false: Some(scores.score_false),
            prob_true: scores.probabilities.prob_true,
            prob_false: scores.probabilities.prob_false,
            error: None,
        }
    }

    pub fn fallback(
        prediction: impl Into<String>,
        error: &ExtractionError,
        logit_true: Option<f64>,
        logit_false: Option<f64>,
    ) -> Self {
        Self {
            prediction: prediction.into(),
            logit_true,
            logit_false,
            prob_true: Probabilities::NEUTRAL.prob_true,
            prob_false: Probabilities::NEUTRAL.prob_false,
            error: Some(error.to_string()),
        }
    }

    /// Relevance score, equal to `prob_true`.
    #[inline]
    pub fn score(&self) -> f64 {
        self.prob_true
    }

    /// `prob_true > prob_false`.
    #[inline]
    pub fn is_relevant(&self) -> bool {
        self.prob_true > self.prob_false
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Where a [`RelevanceResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Inference,
    Cache,
}

/// [`RelevanceResult`] plus the request metadata the HTTP layer reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub result: RelevanceResult,
    pub source: ResultSource,
    pub request_id: uuid::Uuid,
}

impl ScoreOutcome {
    pub fn is_cached(&self) -> bool {
        self.source == ResultSource::Cache
    }
}
