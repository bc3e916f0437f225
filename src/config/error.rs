//! Start-up configuration errors for the judge service.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// `JUDGE_PORT` parsed but is 0.
    #[error("invalid port '{value}' in JUDGE_PORT: must be between 1 and 65535")]
    InvalidPort { value: String },

    /// `JUDGE_PORT` is not a number.
    #[error("failed to parse port '{value}' in JUDGE_PORT: {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// `JUDGE_BIND_ADDR` plus port does not form a socket address.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// The chat backend is enabled but its tokenizer path is not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// `monot5` or `chat` settings out of range.
    #[error("invalid {component} configuration: {reason}")]
    InvalidSetting {
        component: &'static str,
        reason: String,
    },

    /// MonoT5 model directory or chat tokenizer file is missing.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// `JUDGE_MONOT5_PATH` points at a file.
    #[error("MonoT5 model path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
