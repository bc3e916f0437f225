//! Scripted invoker for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::InferenceError;
use super::{GenerationRequest, InferenceInvoker};
use crate::decision::{DecisionStrategy, GenerationTrace, ScoreDistribution, ScoreScale};

/// Vocabulary ids used by [`MockInvoker::first_token`] traces.
pub const MOCK_TRUE_ID: u32 = 1176;
pub const MOCK_FALSE_ID: u32 = 6136;

#[derive(Debug, Clone)]
enum MockOutcome {
    Trace(GenerationTrace),
    Failure(String),
}

/// Returns a fixed trace (or failure) for every call and records what it was asked.
#[derive(Debug)]
pub struct MockInvoker {
    name: String,
    strategy: DecisionStrategy,
    outcome: RwLock<MockOutcome>,
    calls: AtomicUsize,
    last_request: RwLock<Option<GenerationRequest>>,
}

impl MockInvoker {
    pub fn new(name: impl Into<String>, strategy: DecisionStrategy, trace: GenerationTrace) -> Self {
        Self {
            name: name.into(),
            strategy,
            outcome: RwLock::new(MockOutcome::Trace(trace)),
            calls: AtomicUsize::new(0),
            last_request: RwLock::new(None),
        }
    }

    /// A seq2seq-style invoker whose single decoder step scores the labels with these logits.
    pub fn first_token(logit_true: f64, logit_false: f64) -> Self {
        Self::new(
            "mock-monot5",
            DecisionStrategy::FirstToken {
                true_id: MOCK_TRUE_ID,
                false_id: MOCK_FALSE_ID,
            },
            first_token_trace(logit_true, logit_false),
        )
    }

    /// A chat-style invoker answering `{ "relevance": ... }` with these label log-probabilities.
    pub fn chat(logprob_true: f64, logprob_false: f64) -> Self {
        Self::new(
            "mock-chat",
            DecisionStrategy::RankedScan,
            relevance_trace(logprob_true, logprob_false),
        )
    }

    pub fn failing(strategy: DecisionStrategy, reason: impl Into<String>) -> Self {
        let empty = GenerationTrace::new(Vec::new(), Vec::new(), ScoreScale::LogProb);
        let invoker = Self::new("mock-failing", strategy, empty);
        invoker.set_failure(reason);
        invoker
    }

    pub fn set_trace(&self, trace: GenerationTrace) {
        *self.outcome.write() = MockOutcome::Trace(trace);
    }

    pub fn set_failure(&self, reason: impl Into<String>) {
        *self.outcome.write() = MockOutcome::Failure(reason.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.read().clone()
    }
}

#[async_trait]
impl InferenceInvoker for MockInvoker {
    fn name(&self) -> &str {
        &self.name
    }

    fn strategy(&self) -> DecisionStrategy {
        self.strategy
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationTrace, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.write() = Some(request.clone());

        match &*self.outcome.read() {
            MockOutcome::Trace(trace) => Ok(trace.clone()),
            MockOutcome::Failure(reason) => Err(InferenceError::InferenceFailed {
                reason: reason.clone(),
            }),
        }
    }
}

/// One decoder step over a tiny vocabulary containing both labels.
pub fn first_token_trace(logit_true: f64, logit_false: f64) -> GenerationTrace {
    let step = ScoreDistribution::ranked([
        (Some(0), "<pad>", -20.0),
        (Some(MOCK_TRUE_ID), "true", logit_true),
        (Some(MOCK_FALSE_ID), "false", logit_false),
    ]);
    let token = step
        .top()
        .map(|entry| entry.token.to_string())
        .unwrap_or_default();
    GenerationTrace::new(vec![step], vec![token], ScoreScale::Logit)
}

/// `{"relevance": <label>}` with both labels in the top-K at the value position.
pub fn relevance_trace(logprob_true: f64, logprob_false: f64) -> GenerationTrace {
    let decision = ScoreDistribution::ranked([
        (None, " true", logprob_true),
        (None, " false", logprob_false),
    ]);
    let positions = vec![
        ScoreDistribution::ranked([(None, "{", -0.0001), (None, "```", -9.5)]),
        ScoreDistribution::ranked([(None, "\"relevance", -0.0002)]),
        ScoreDistribution::ranked([(None, "\":", -0.0001)]),
        decision,
        ScoreDistribution::ranked([(None, "}", -0.0003)]),
    ];
    let tokens = positions
        .iter()
        .map(|p| p.top().map(|e| e.token.to_string()).unwrap_or_default())
        .collect();
    GenerationTrace::new(positions, tokens, ScoreScale::LogProb)
}

/// Generated text only, with no label anywhere at rank 1.
pub fn unparseable_trace(text: &str) -> GenerationTrace {
    let positions = vec![ScoreDistribution::ranked([(None, text, -0.01)])];
    GenerationTrace::new(positions, vec![text.to_string()], ScoreScale::LogProb)
}
