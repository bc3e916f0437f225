use std::fmt;

use thiserror::Error;

/// Which label token could not be found at the decision position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingToken {
    True,
    False,
    Both,
}

impl MissingToken {
    pub(crate) fn from_presence(has_true: bool, has_false: bool) -> Option<Self> {
        match (has_true, has_false) {
            (true, true) => None,
            (false, true) => Some(MissingToken::True),
            (true, false) => Some(MissingToken::False),
            (false, false) => Some(MissingToken::Both),
        }
    }
}

impl fmt::Display for MissingToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingToken::True => write!(f, "true"),
            MissingToken::False => write!(f, "false"),
            MissingToken::Both => write!(f, "true and false"),
        }
    }
}

/// Recoverable failures of the decision locator and probability extractor.
///
/// All variants map to the neutral `0.5 / 0.5` fallback with an explanatory error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("could not detect true/false token position")]
    DecisionNotFound,

    #[error("could not find {missing} token(s) in scores at position {position}")]
    TokenMissing {
        position: usize,
        missing: MissingToken,
    },

    #[error("true/false score at position {position} is not a number")]
    InvalidScore { position: usize },
}

impl ExtractionError {
    /// Short machine-readable kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::DecisionNotFound => "decision_not_found",
            ExtractionError::TokenMissing { .. } => "token_missing",
            ExtractionError::InvalidScore { .. } => "invalid_score",
        }
    }
}
