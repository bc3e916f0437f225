//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `JUDGE_*` environment variables. A backend is
//! enabled when its model path (MonoT5) or runtime URL (chat) is set.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;

use crate::inference::{ChatConfig, MonoT5Config};
use crate::scoring::ResultCache;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `JUDGE_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Max memoized results per backend. `0` disables the cache. Default: `10_000`.
    pub cache_capacity: u64,

    /// Seq2seq pair-scoring backend (`POST /eval`).
    pub monot5: MonoT5Config,

    /// Chat logprob backend (`POST /prob`, `POST /judge`).
    pub chat: ChatConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            cache_capacity: ResultCache::DEFAULT_CAPACITY,
            monot5: MonoT5Config::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "JUDGE_PORT";
    const ENV_BIND_ADDR: &'static str = "JUDGE_BIND_ADDR";
    const ENV_CACHE_CAPACITY: &'static str = "JUDGE_CACHE_CAPACITY";
    pub(crate) const ENV_CHAT_TOKENIZER_PATH: &'static str = "JUDGE_CHAT_TOKENIZER_PATH";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);

        Ok(Self {
            port,
            bind_addr,
            cache_capacity,
            monot5: MonoT5Config::from_env(),
            chat: ChatConfig::from_env(),
        })
    }

    /// Validates paths and component settings (does not load anything).
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.monot5
            .validate()
            .map_err(|reason| ConfigError::InvalidSetting {
                component: "monot5",
                reason,
            })?;

        if let Some(ref path) = self.monot5.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        self.chat
            .validate()
            .map_err(|reason| ConfigError::InvalidSetting {
                component: "chat",
                reason,
            })?;

        if self.chat.is_enabled() {
            let Some(ref path) = self.chat.tokenizer_path else {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_CHAT_TOKENIZER_PATH,
                });
            };
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
        }

        Ok(())
    }

    /// `true` when at least one backend is configured.
    pub fn has_backend(&self) -> bool {
        self.monot5.is_enabled() || self.chat.is_enabled()
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}
