use serde::{Deserialize, Serialize};

use crate::scoring::RelevanceResult;

/// `POST /eval` body.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalRequest {
    pub query: String,
    pub document: String,
}

/// `POST /eval` reply. Logits are `null` when extraction failed before they were found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResponse {
    pub prediction: String,
    pub score: f64,
    pub logit_true: Option<f64>,
    pub logit_false: Option<f64>,
    pub prob_true: f64,
    pub prob_false: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RelevanceResult> for EvalResponse {
    fn from(result: &RelevanceResult) -> Self {
        Self {
            prediction: result.prediction.clone(),
            score: result.score(),
            logit_true: finite_or_none(result.logit_true),
            logit_false: finite_or_none(result.logit_false),
            prob_true: result.prob_true,
            prob_false: result.prob_false,
            error: result.error.clone(),
        }
    }
}

/// `POST /prob` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbRequest {
    pub prompt: String,
}

/// `POST /judge` body.
#[derive(Debug, Clone, Deserialize)]
pub struct JudgeRequest {
    pub query: String,
    #[serde(default)]
    pub narrative: Option<String>,
    pub document: String,
}

/// `POST /prob` and `POST /judge` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbResponse {
    pub p_true: f64,
    pub p_false: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RelevanceResult> for ProbResponse {
    fn from(result: &RelevanceResult) -> Self {
        Self {
            p_true: result.prob_true,
            p_false: result.prob_false,
            error: result.error.clone(),
        }
    }
}

// JSON cannot carry infinities.
fn finite_or_none(score: Option<f64>) -> Option<f64> {
    score.filter(|s| s.is_finite())
}
