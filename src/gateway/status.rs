use crate::scoring::ScoreOutcome;

pub const JUDGE_STATUS_HEADER: &str = "x-judge-status";
pub const JUDGE_STATUS_HEALTHY: &str = "healthy";
pub const JUDGE_STATUS_READY: &str = "ready";
pub const JUDGE_STATUS_UNAVAILABLE: &str = "unavailable";
pub const JUDGE_STATUS_DISABLED: &str = "disabled";

/// How a scoring request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JudgeStatus {
    /// Both labels found; probabilities computed.
    Scored,
    /// Extraction failed; neutral probabilities with an error.
    Fallback,
    /// Served from the result cache.
    Cached,
}

impl JudgeStatus {
    pub fn from_outcome(outcome: &ScoreOutcome) -> Self {
        if outcome.is_cached() {
            JudgeStatus::Cached
        } else if outcome.result.is_fallback() {
            JudgeStatus::Fallback
        } else {
            JudgeStatus::Scored
        }
    }

    #[inline]
    pub fn as_header_value(&self) -> &'static str {
        match self {
            JudgeStatus::Scored => "scored",
            JudgeStatus::Fallback => "fallback",
            JudgeStatus::Cached => "cached",
        }
    }
}

impl std::fmt::Display for JudgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_header_value())
    }
}
