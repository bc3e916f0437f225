pub mod config;


pub use config::{DEFAULT_MAX_NEW_TOKENS, MAX_INPUT_TOKENS, MonoT5Config};

use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::t5;
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::device::select_device;
use super::error::InferenceError;
use super::tokenizer::load_tokenizer_with_truncation;
use super::{GenerationRequest, InferenceInvoker};
use crate::decision::{
    DecisionStrategy, FALSE_LABEL, GenerationTrace, ScoreDistribution, ScoreScale, TRUE_LABEL,
};

struct MonoT5Model {
    // candle's T5 decoder keeps a KV cache and needs `&mut self`.
    model: Mutex<t5::T5ForConditionalGeneration>,
    tokenizer: Tokenizer,
    vocabulary: Vec<Arc<str>>,
    device: Device,
    decoder_start_id: u32,
    eos_id: u32,
}

impl MonoT5Model {
    fn generate(
        &self,
        prompt: &str,
        max_new_tokens: usize,
    ) -> Result<GenerationTrace, InferenceError> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| InferenceError::TokenizationFailed {
                reason: e.to_string(),
            })?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;

        let mut positions = Vec::with_capacity(max_new_tokens);
        let mut tokens = Vec::with_capacity(max_new_tokens);
        let mut decoder_ids = vec![self.decoder_start_id];

        let mut model = self.model.lock();
        model.clear_kv_cache();
        let encoder_output = model.encode(&input_ids)?;

        for _ in 0..max_new_tokens {
            // The full decoder prefix is replayed each step, so the cache must start empty.
            model.clear_kv_cache();
            let decoder_input = Tensor::new(decoder_ids.as_slice(), &self.device)?.unsqueeze(0)?;
            let logits = model
                .decode(&decoder_input, &encoder_output)?
                .to_dtype(DType::F32)?
                .flatten_all()?
                .to_vec1::<f32>()?;

            let dist = self.distribution(&logits);
            let Some(top) = dist.top() else {
                return Err(InferenceError::MalformedResponse {
                    reason: "decoder produced no logits".to_string(),
                });
            };
            let next_id = top.token_id.unwrap_or(self.eos_id);
            tokens.push(top.token.to_string());
            positions.push(dist);

            if next_id == self.eos_id {
                break;
            }
            decoder_ids.push(next_id);
        }
        model.clear_kv_cache();
        drop(model);

        debug!(
            input_tokens = encoding.get_ids().len(),
            generated = positions.len(),
            "MonoT5 generation complete"
        );

        Ok(GenerationTrace::new(positions, tokens, ScoreScale::Logit))
    }

    fn distribution(&self, logits: &[f32]) -> ScoreDistribution {
        let empty: Arc<str> = Arc::from("");
        ScoreDistribution::ranked(logits.iter().enumerate().map(|(id, &score)| {
            let token = self.vocabulary.get(id).cloned().unwrap_or_else(|| empty.clone());
            (Some(id as u32), token, f64::from(score))
        }))
    }
}

/// In-process MonoT5 relevance model.
///
/// The decision is the first generated token; its logits over the full vocabulary form the
/// only position of the returned trace (more positions when `max_new_tokens > 1`).
pub struct MonoT5Invoker {
    inner: Arc<MonoT5Model>,
    config: MonoT5Config,
    true_id: u32,
    false_id: u32,
}

impl std::fmt::Debug for MonoT5Invoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonoT5Invoker")
            .field("device", &format!("{:?}", self.inner.device))
            .field("config", &self.config)
            .field("true_id", &self.true_id)
            .field("false_id", &self.false_id)
            .finish()
    }
}

impl MonoT5Invoker {
    pub fn load(config: MonoT5Config) -> Result<Self, InferenceError> {
        if let Err(msg) = config.validate() {
            return Err(InferenceError::InvalidConfig { reason: msg });
        }

        let Some(model_path) = config.model_path.clone() else {
            return Err(InferenceError::InvalidConfig {
                reason: "MonoT5 model path is not configured".to_string(),
            });
        };

        if !model_path.exists() {
            return Err(InferenceError::ModelNotFound { path: model_path });
        }

        let config_path = model_path.join("config.json");
        if !config_path.exists() {
            return Err(InferenceError::ModelLoadFailed {
                reason: format!("Missing config.json in {}", model_path.display()),
            });
        }

        let weights_path = model_path.join("model.safetensors");
        if !weights_path.exists() {
            return Err(InferenceError::ModelLoadFailed {
                reason: format!("Missing model.safetensors in {}", model_path.display()),
            });
        }

        let device = select_device(config.device);
        debug!(?device, "Selected compute device for MonoT5");

        info!(model_path = %model_path.display(), "Loading MonoT5 model");

        let config_content = std::fs::read_to_string(&config_path)?;
        let model_config: t5::Config =
            serde_json::from_str(&config_content).map_err(|e| InferenceError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {}", e),
            })?;

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = t5::T5ForConditionalGeneration::load(vb, &model_config).map_err(|e| {
            InferenceError::ModelLoadFailed {
                reason: format!("Failed to load T5 weights: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, config.max_input_tokens)
            .map_err(|e| InferenceError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        Self::from_parts(config, &model_config, model, tokenizer, device)
    }

    /// Wraps an already-built model; resolves label ids and the decoded vocabulary.
    pub(crate) fn from_parts(
        config: MonoT5Config,
        model_config: &t5::Config,
        model: t5::T5ForConditionalGeneration,
        tokenizer: Tokenizer,
        device: Device,
    ) -> Result<Self, InferenceError> {
        let true_id = label_id(&tokenizer, TRUE_LABEL)?;
        let false_id = label_id(&tokenizer, FALSE_LABEL)?;
        let vocabulary = build_vocabulary(&tokenizer, model_config.vocab_size);

        let decoder_start_id = model_config
            .decoder_start_token_id
            .unwrap_or(model_config.pad_token_id) as u32;
        let eos_id = model_config.eos_token_id as u32;

        info!(
            true_id,
            false_id,
            vocab_size = vocabulary.len(),
            max_input_tokens = config.max_input_tokens,
            "MonoT5 model loaded successfully"
        );

        Ok(Self {
            inner: Arc::new(MonoT5Model {
                model: Mutex::new(model),
                tokenizer,
                vocabulary,
                device,
                decoder_start_id,
                eos_id,
            }),
            config,
            true_id,
            false_id,
        })
    }

    pub fn config(&self) -> &MonoT5Config {
        &self.config
    }

    pub fn label_ids(&self) -> (u32, u32) {
        (self.true_id, self.false_id)
    }
}

#[async_trait]
impl InferenceInvoker for MonoT5Invoker {
    fn name(&self) -> &str {
        "monot5"
    }

    fn strategy(&self) -> DecisionStrategy {
        DecisionStrategy::FirstToken {
            true_id: self.true_id,
            false_id: self.false_id,
        }
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationTrace, InferenceError> {
        let inner = Arc::clone(&self.inner);
        let prompt = request.prompt.clone();
        let max_new_tokens = request.max_new_tokens.max(1);

        tokio::task::spawn_blocking(move || inner.generate(&prompt, max_new_tokens))
            .await
            .map_err(|e| InferenceError::InferenceFailed {
                reason: format!("MonoT5 task failed: {}", e),
            })?
    }
}

/// First id of `label` encoded without special tokens.
pub(crate) fn label_id(tokenizer: &Tokenizer, label: &str) -> Result<u32, InferenceError> {
    let encoding = tokenizer
        .encode(label, false)
        .map_err(|e| InferenceError::TokenizationFailed {
            reason: e.to_string(),
        })?;

    encoding
        .get_ids()
        .first()
        .copied()
        .ok_or_else(|| InferenceError::ModelLoadFailed {
            reason: format!("tokenizer has no token for '{}'", label),
        })
}

/// Decoded text of every id below `vocab_size`. Special tokens and ids the tokenizer does not
/// know map to "".
fn build_vocabulary(tokenizer: &Tokenizer, vocab_size: usize) -> Vec<Arc<str>> {
    (0..vocab_size as u32)
        .map(|id| {
            let text = tokenizer.decode(&[id], true).unwrap_or_default();
            Arc::from(text.as_str())
        })
        .collect()
}
