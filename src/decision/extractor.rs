use tracing::debug;

use super::error::{ExtractionError, MissingToken};
use super::types::{
    DecisionOutcome, DecisionScores, GenerationTrace, Probabilities, ScoreDistribution,
};

/// Two-way softmax restricted to the true/false scores.
///
/// Works on logits and log-probabilities alike. Infinite inputs take the limiting value of the
/// softmax instead of being exponentiated. Inputs must not be NaN.
pub fn extract_probabilities(score_true: f64, score_false: f64) -> Probabilities {
    debug_assert!(!score_true.is_nan() && !score_false.is_nan());

    const CERTAIN_TRUE: Probabilities = Probabilities {
        prob_true: 1.0,
        prob_false: 0.0,
    };
    const CERTAIN_FALSE: Probabilities = Probabilities {
        prob_true: 0.0,
        prob_false: 1.0,
    };

    let true_zero = score_true == f64::NEG_INFINITY;
    let false_zero = score_false == f64::NEG_INFINITY;

    match (true_zero, false_zero) {
        (true, true) => return Probabilities::NEUTRAL,
        (true, false) => return CERTAIN_FALSE,
        (false, true) => return CERTAIN_TRUE,
        (false, false) => {}
    }

    if score_true == score_false {
        return Probabilities::NEUTRAL;
    }
    if score_true == f64::INFINITY {
        return CERTAIN_TRUE;
    }
    if score_false == f64::INFINITY {
        return CERTAIN_FALSE;
    }

    let max = score_true.max(score_false);
    let exp_true = (score_true - max).exp();
    let exp_false = (score_false - max).exp();
    let total = exp_true + exp_false;

    Probabilities {
        prob_true: exp_true / total,
        prob_false: exp_false / total,
    }
}

/// Looks up both label scores at the decision position and normalizes them.
pub fn scores_at(
    trace: &GenerationTrace,
    outcome: &DecisionOutcome,
) -> Result<DecisionScores, ExtractionError> {
    let position = outcome.position;
    let dist = trace.position(position).ok_or(ExtractionError::TokenMissing {
        position,
        missing: MissingToken::Both,
    })?;

    let (score_true, score_false) = match label_scores(dist, outcome) {
        (Some(t), Some(f)) => (t, f),
        (t, f) => {
            let missing = MissingToken::from_presence(t.is_some(), f.is_some())
                .unwrap_or(MissingToken::Both);
            return Err(ExtractionError::TokenMissing { position, missing });
        }
    };

    if score_true.is_nan() || score_false.is_nan() {
        return Err(ExtractionError::InvalidScore { position });
    }

    if score_true == f64::NEG_INFINITY && score_false == f64::NEG_INFINITY {
        debug!(position, "Both true and false have zero probability");
    }

    Ok(DecisionScores {
        position,
        score_true,
        score_false,
        probabilities: extract_probabilities(score_true, score_false),
    })
}

/// Label scores found before extraction failed, for diagnostics in fallback results.
pub fn partial_scores(
    trace: &GenerationTrace,
    outcome: &DecisionOutcome,
) -> (Option<f64>, Option<f64>) {
    let Some(dist) = trace.position(outcome.position) else {
        return (None, None);
    };

    let (score_true, score_false) = label_scores(dist, outcome);
    (
        score_true.filter(|s| !s.is_nan()),
        score_false.filter(|s| !s.is_nan()),
    )
}

// Entries are visited in rank order; the first match wins per label, and an entry claimed by
// the false label is not considered for the true label.
fn label_scores(dist: &ScoreDistribution, outcome: &DecisionOutcome) -> (Option<f64>, Option<f64>) {
    let mut score_true = None;
    let mut score_false = None;

    for entry in dist.entries() {
        if score_false.is_none() && outcome.false_token.matches(entry) {
            debug!(token = %entry.token, score = entry.score, "Found false token");
            score_false = Some(entry.score);
        } else if score_true.is_none() && outcome.true_token.matches(entry) {
            debug!(token = %entry.token, score = entry.score, "Found true token");
            score_true = Some(entry.score);
        }

        if score_true.is_some() && score_false.is_some() {
            break;
        }
    }

    (score_true, score_false)
}
