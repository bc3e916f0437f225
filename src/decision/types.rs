use std::sync::Arc;

/// Numeric scale of the scores in a [`GenerationTrace`].
///
/// Restricted two-way softmax has the same form over raw logits and log-probabilities, so the
/// scale only matters for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreScale {
    /// Raw, unnormalized decoder logits.
    Logit,
    /// Log-probabilities as reported by a serving runtime.
    LogProb,
}

impl ScoreScale {
    /// Returns a short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreScale::Logit => "logit",
            ScoreScale::LogProb => "logprob",
        }
    }
}

/// One candidate token at one generation position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    /// Vocabulary id, when the runtime reports one.
    pub token_id: Option<u32>,
    /// Decoded token text.
    pub token: Arc<str>,
    /// 1-based rank by descending score.
    pub rank: u32,
    /// Logit or log-probability.
    pub score: f64,
}

impl ScoreEntry {
    pub fn new(token_id: Option<u32>, token: impl Into<Arc<str>>, rank: u32, score: f64) -> Self {
        Self {
            token_id,
            token: token.into(),
            rank,
            score,
        }
    }
}

/// Candidate scores at a single generation position, held in rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreDistribution {
    entries: Vec<ScoreEntry>,
}

impl ScoreDistribution {
    /// Builds a distribution from entries carrying their own ranks.
    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by_key(|e| e.rank);
        Self { entries }
    }

    /// Builds a distribution from `(token_id, token, score)` triples, assigning ranks by
    /// descending score. Ties keep their input order.
    pub fn ranked<T>(candidates: impl IntoIterator<Item = (Option<u32>, T, f64)>) -> Self
    where
        T: Into<Arc<str>>,
    {
        let mut scored: Vec<(Option<u32>, Arc<str>, f64)> = candidates
            .into_iter()
            .map(|(id, token, score)| (id, token.into(), score))
            .collect();

        scored.sort_by(|a, b| b.2.total_cmp(&a.2));

        let entries = scored
            .into_iter()
            .enumerate()
            .map(|(idx, (id, token, score))| ScoreEntry {
                token_id: id,
                token,
                rank: idx as u32 + 1,
                score,
            })
            .collect();

        Self { entries }
    }

    /// The rank-1 candidate, if any.
    pub fn top(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }

    /// Entries in rank order.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-position score distributions for one generation, plus the decoded tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTrace {
    positions: Vec<ScoreDistribution>,
    tokens: Vec<String>,
    scale: ScoreScale,
}

impl GenerationTrace {
    pub fn new(positions: Vec<ScoreDistribution>, tokens: Vec<String>, scale: ScoreScale) -> Self {
        Self {
            positions,
            tokens,
            scale,
        }
    }

    pub fn positions(&self) -> &[ScoreDistribution] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<&ScoreDistribution> {
        self.positions.get(index)
    }

    /// Decoded token at `index`, falling back to the rank-1 candidate text.
    pub fn token_at(&self, index: usize) -> Option<&str> {
        self.tokens
            .get(index)
            .map(String::as_str)
            .or_else(|| self.position(index).and_then(|d| d.top()).map(|e| &*e.token))
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// All decoded tokens concatenated.
    pub fn text(&self) -> String {
        self.tokens.concat()
    }

    pub fn scale(&self) -> ScoreScale {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// How the decision position is found in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStrategy {
    /// The first generated token is the decision; labels are matched by vocabulary id.
    FirstToken { true_id: u32, false_id: u32 },
    /// The first position whose rank-1 token is exactly `true`/`false`; labels are matched by
    /// substring of the decoded token text.
    RankedScan,
}

impl DecisionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStrategy::FirstToken { .. } => "first_token",
            DecisionStrategy::RankedScan => "ranked_scan",
        }
    }
}

/// Identifies a label's token inside a [`ScoreDistribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMatcher {
    Id(u32),
    Contains(&'static str),
}

impl TokenMatcher {
    pub fn matches(&self, entry: &ScoreEntry) -> bool {
        match self {
            TokenMatcher::Id(id) => entry.token_id == Some(*id),
            TokenMatcher::Contains(needle) => entry.token.contains(needle),
        }
    }
}

/// Where the model committed to its decision and how to find each label there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOutcome {
    pub position: usize,
    pub true_token: TokenMatcher,
    pub false_token: TokenMatcher,
}

/// Calibrated true/false probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probabilities {
    pub prob_true: f64,
    pub prob_false: f64,
}

impl Probabilities {
    /// The uninformative `0.5 / 0.5` outcome.
    pub const NEUTRAL: Self = Self {
        prob_true: 0.5,
        prob_false: 0.5,
    };

    /// Exchanges the two probabilities.
    pub fn swap(self) -> Self {
        Self {
            prob_true: self.prob_false,
            prob_false: self.prob_true,
        }
    }
}

/// Raw label scores at the decision position and the probabilities derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionScores {
    pub position: usize,
    pub score_true: f64,
    pub score_false: f64,
    pub probabilities: Probabilities,
}
