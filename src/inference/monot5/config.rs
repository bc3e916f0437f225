use std::path::PathBuf;

use crate::inference::device::DevicePreference;

/// Input limit of the MonoT5 encoder.
pub const MAX_INPUT_TOKENS: usize = 512;

/// One decoder step: the relevance label.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 1;

#[derive(Debug, Clone)]
pub struct MonoT5Config {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_path: Option<PathBuf>,

    pub max_input_tokens: usize,

    pub max_new_tokens: usize,

    pub device: DevicePreference,
}

impl Default for MonoT5Config {
    fn default() -> Self {
        Self {
            model_path: None,
            max_input_tokens: MAX_INPUT_TOKENS,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            device: DevicePreference::Auto,
        }
    }
}

impl MonoT5Config {
    const ENV_MODEL_PATH: &'static str = "JUDGE_MONOT5_PATH";
    const ENV_MAX_INPUT_TOKENS: &'static str = "JUDGE_MONOT5_MAX_INPUT_TOKENS";
    const ENV_DEVICE: &'static str = "JUDGE_DEVICE";

    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    /// `true` when a model directory is configured.
    pub fn is_enabled(&self) -> bool {
        self.model_path.is_some()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_input_tokens == 0 {
            return Err("max_input_tokens must be greater than 0".to_string());
        }

        if self.max_new_tokens == 0 {
            return Err("max_new_tokens must be greater than 0".to_string());
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }

    pub fn from_env() -> Self {
        let model_path = std::env::var(Self::ENV_MODEL_PATH)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let max_input_tokens = std::env::var(Self::ENV_MAX_INPUT_TOKENS)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(MAX_INPUT_TOKENS);

        let device = std::env::var(Self::ENV_DEVICE)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            model_path,
            max_input_tokens,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            device,
        }
    }
}
