use std::sync::Arc;

use super::error::GatewayError;
use crate::scoring::RelevanceScorer;

/// Shared, read-only handler state. Each backend is optional.
#[derive(Clone, Default)]
pub struct HandlerState {
    /// Seq2seq pair scorer behind `POST /eval`.
    pub pair: Option<Arc<RelevanceScorer>>,

    /// Chat logprob scorer behind `POST /prob` and `POST /judge`.
    pub chat: Option<Arc<RelevanceScorer>>,
}

impl HandlerState {
    pub fn new(pair: Option<Arc<RelevanceScorer>>, chat: Option<Arc<RelevanceScorer>>) -> Self {
        Self { pair, chat }
    }

    pub fn with_pair(mut self, scorer: RelevanceScorer) -> Self {
        self.pair = Some(Arc::new(scorer));
        self
    }

    pub fn with_chat(mut self, scorer: RelevanceScorer) -> Self {
        self.chat = Some(Arc::new(scorer));
        self
    }

    pub fn has_backend(&self) -> bool {
        self.pair.is_some() || self.chat.is_some()
    }

    pub(crate) fn pair_scorer(&self) -> Result<&RelevanceScorer, GatewayError> {
        self.pair
            .as_deref()
            .ok_or(GatewayError::BackendUnavailable("monot5"))
    }

    pub(crate) fn chat_scorer(&self) -> Result<&RelevanceScorer, GatewayError> {
        self.chat
            .as_deref()
            .ok_or(GatewayError::BackendUnavailable("chat"))
    }
}

impl std::fmt::Debug for HandlerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerState")
            .field("pair", &self.pair.as_ref().map(|s| s.invoker_name().to_string()))
            .field("chat", &self.chat.as_ref().map(|s| s.invoker_name().to_string()))
            .finish()
    }
}
