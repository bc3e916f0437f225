use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";

/// Prompt token budget: the 8192-token context minus room for the system message and reply.
pub const DEFAULT_MAX_PROMPT_TOKENS: usize = 7900;

/// Enough for `{ "relevance": false }` under any tokenizer.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 20;

/// Candidates per position. Both labels must be among them at the decision position, so the
/// runtime has to allow this many (vLLM: `--max-logprobs 1000`).
pub const DEFAULT_TOP_LOGPROBS: u32 = 1000;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a strict TREC assessor that outputs machine-readable judgments. Return only a JSON object in the format: { \"relevance\": true } or { \"relevance\": false } Do not include any other text, explanation, or reasoning.";

/// Settings for the OpenAI-compatible chat runtime.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/v1`.
    pub base_url: Option<String>,

    pub model: String,

    pub api_key: Option<String>,

    /// Tokenizer of `model`, used for prompt truncation.
    pub tokenizer_path: Option<PathBuf>,

    pub max_prompt_tokens: usize,

    pub max_new_tokens: usize,

    pub top_logprobs: u32,

    pub timeout: Duration,

    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            api_key: None,
            tokenizer_path: None,
            max_prompt_tokens: DEFAULT_MAX_PROMPT_TOKENS,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            top_logprobs: DEFAULT_TOP_LOGPROBS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatConfig {
    const ENV_URL: &'static str = "JUDGE_CHAT_URL";
    const ENV_MODEL: &'static str = "JUDGE_CHAT_MODEL";
    const ENV_API_KEY: &'static str = "JUDGE_CHAT_API_KEY";
    const ENV_TOKENIZER_PATH: &'static str = "JUDGE_CHAT_TOKENIZER_PATH";
    const ENV_MAX_PROMPT_TOKENS: &'static str = "JUDGE_MAX_PROMPT_TOKENS";
    const ENV_MAX_NEW_TOKENS: &'static str = "JUDGE_MAX_NEW_TOKENS";
    const ENV_TOP_LOGPROBS: &'static str = "JUDGE_TOP_LOGPROBS";
    const ENV_TIMEOUT_SECS: &'static str = "JUDGE_CHAT_TIMEOUT_SECS";
    const ENV_SYSTEM_PROMPT: &'static str = "JUDGE_CHAT_SYSTEM_PROMPT";

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    pub fn with_tokenizer_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.tokenizer_path = Some(path.into());
        self
    }

    pub fn with_top_logprobs(mut self, top_logprobs: u32) -> Self {
        self.top_logprobs = top_logprobs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `true` when a runtime URL is configured.
    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    /// `{base_url}/chat/completions`.
    pub fn completions_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|url| format!("{}/chat/completions", url.trim_end_matches('/')))
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!("chat url must start with http:// or https://, got {url}"));
        }

        if self.model.trim().is_empty() {
            return Err("chat model name cannot be empty".to_string());
        }

        if self.max_prompt_tokens == 0 {
            return Err("max_prompt_tokens must be greater than 0".to_string());
        }

        if self.max_new_tokens == 0 {
            return Err("max_new_tokens must be greater than 0".to_string());
        }

        if self.top_logprobs == 0 {
            return Err("top_logprobs must be greater than 0".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: optional_string(Self::ENV_URL),
            model: optional_string(Self::ENV_MODEL).unwrap_or(defaults.model),
            api_key: optional_string(Self::ENV_API_KEY),
            tokenizer_path: optional_string(Self::ENV_TOKENIZER_PATH).map(PathBuf::from),
            max_prompt_tokens: parsed(Self::ENV_MAX_PROMPT_TOKENS)
                .unwrap_or(defaults.max_prompt_tokens),
            max_new_tokens: parsed(Self::ENV_MAX_NEW_TOKENS).unwrap_or(defaults.max_new_tokens),
            top_logprobs: parsed(Self::ENV_TOP_LOGPROBS).unwrap_or(defaults.top_logprobs),
            timeout: parsed(Self::ENV_TIMEOUT_SECS)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            system_prompt: optional_string(Self::ENV_SYSTEM_PROMPT)
                .unwrap_or(defaults.system_prompt),
        }
    }
}

fn optional_string(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(var_name: &str) -> Option<T> {
    std::env::var(var_name).ok().and_then(|v| v.trim().parse().ok())
}
