use tracing::debug;

use super::error::ExtractionError;
use super::types::{DecisionOutcome, DecisionStrategy, GenerationTrace, TokenMatcher};

pub const TRUE_LABEL: &str = "true";
pub const FALSE_LABEL: &str = "false";

/// Finds the position at which the model committed to a true/false decision.
pub fn locate(
    trace: &GenerationTrace,
    strategy: &DecisionStrategy,
) -> Result<DecisionOutcome, ExtractionError> {
    match *strategy {
        DecisionStrategy::FirstToken { true_id, false_id } => {
            if trace.is_empty() {
                debug!("Empty trace, no first token to inspect");
                return Err(ExtractionError::DecisionNotFound);
            }

            Ok(DecisionOutcome {
                position: 0,
                true_token: TokenMatcher::Id(true_id),
                false_token: TokenMatcher::Id(false_id),
            })
        }
        DecisionStrategy::RankedScan => ranked_scan(trace),
    }
}

fn ranked_scan(trace: &GenerationTrace) -> Result<DecisionOutcome, ExtractionError> {
    let position = trace
        .positions()
        .iter()
        .position(|dist| {
            dist.top().is_some_and(|top| {
                let text = top.token.trim();
                text == TRUE_LABEL || text == FALSE_LABEL
            })
        })
        .ok_or(ExtractionError::DecisionNotFound)?;

    debug!(position, "Found true/false decision token");

    Ok(DecisionOutcome {
        position,
        true_token: TokenMatcher::Contains(TRUE_LABEL),
        false_token: TokenMatcher::Contains(FALSE_LABEL),
    })
}
