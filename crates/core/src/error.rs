use thiserror::Error;

use crate::types::VideoDescriptor;

#[derive(Error, Debug)]
pub enum VibenoteError {
    #[error("Validation failed: {reason}")]
    Validation { reason: String },

    #[error("Export delivery failed: {reason}")]
    Transport { reason: String },

    #[error("{reason}")]
    SourceUnavailable { reason: String },

    /// `partial` holds whatever the provider fetched before the quota ran out.
    #[error("{provider} API quota exceeded")]
    QuotaExceeded {
        provider: String,
        partial: Vec<VideoDescriptor>,
    },

    #[error("{provider} request failed: {reason}")]
    ProviderFailed { provider: String, reason: String },

    #[error("{provider} cannot serve this kind of request")]
    UnsupportedRequest { provider: String },

    #[error("Invalid YouTube URL: {url}")]
    InvalidVideoUrl { url: String },

    #[error("Feed parse error: {reason}")]
    FeedParse { reason: String },

    #[error("Missing configuration: {env_var} environment variable is not set")]
    MissingConfig { env_var: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl VibenoteError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VibenoteError>;
