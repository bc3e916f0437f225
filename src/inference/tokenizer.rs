use std::io;
use std::path::Path;

use tokenizers::Tokenizer;

use super::error::InferenceError;

/// Text ↔ token-id conversion used by prompt truncation and the local model.
pub trait TextTokenizer: Send + Sync {
    /// Encodes `text` without special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError>;

    /// Decodes `ids`, skipping special tokens.
    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError>;
}

/// [`TextTokenizer`] over a Hugging Face `tokenizer.json`.
#[derive(Clone)]
pub struct HfTokenizer {
    inner: Tokenizer,
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer")
            .field("vocab_size", &self.inner.get_vocab_size(true))
            .finish()
    }
}

impl HfTokenizer {
    pub fn new(inner: Tokenizer) -> Self {
        Self { inner }
    }

    /// Loads from a model directory or an explicit `tokenizer.json` path.
    pub fn from_path(path: &Path) -> Result<Self, InferenceError> {
        let inner = load_tokenizer(path).map_err(|e| InferenceError::ModelLoadFailed {
            reason: format!("failed to load tokenizer from {}: {}", path.display(), e),
        })?;
        Ok(Self { inner })
    }
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, InferenceError> {
        self.inner
            .encode(text, false)
            .map(|encoding| encoding.get_ids().to_vec())
            .map_err(|e| InferenceError::TokenizationFailed {
                reason: e.to_string(),
            })
    }

    fn decode(&self, ids: &[u32]) -> Result<String, InferenceError> {
        self.inner
            .decode(ids, true)
            .map_err(|e| InferenceError::TokenizationFailed {
                reason: e.to_string(),
            })
    }
}

/// Loads a tokenizer from a model directory or explicit tokenizer.json path.
pub fn load_tokenizer(model_path: &Path) -> io::Result<Tokenizer> {
    let tokenizer_path = if model_path
        .file_name()
        .is_some_and(|name| name == std::ffi::OsStr::new("tokenizer.json"))
    {
        model_path.to_path_buf()
    } else if model_path.is_dir() {
        model_path.join("tokenizer.json")
    } else {
        model_path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Model path has no parent"))?
            .join("tokenizer.json")
    };

    Tokenizer::from_file(&tokenizer_path).map_err(io::Error::other)
}

/// Loads a tokenizer that truncates encodings to `max_len` tokens.
///
/// Seq2seq relevance models have a fixed input length; longer inputs are cut to fit.
pub fn load_tokenizer_with_truncation(model_path: &Path, max_len: usize) -> io::Result<Tokenizer> {
    use tokenizers::TruncationParams;

    let mut tokenizer = load_tokenizer(model_path)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}

/// Word-level tokenizer over `words` (whitespace split, id = index + 1, `[UNK]` = 0).
#[cfg(test)]
pub(crate) fn word_level_tokenizer(words: &[&str]) -> Tokenizer {
    use std::str::FromStr;

    let mut vocab = serde_json::Map::new();
    vocab.insert("[UNK]".to_string(), serde_json::json!(0));
    for (idx, word) in words.iter().enumerate() {
        vocab.insert(word.to_string(), serde_json::json!(idx + 1));
    }

    let spec = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": { "type": "WordLevel", "vocab": vocab, "unk_token": "[UNK]" }
    });

    Tokenizer::from_str(&spec.to_string()).expect("valid word-level tokenizer")
}
