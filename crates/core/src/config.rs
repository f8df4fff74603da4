use crate::error::{Result, VibenoteError};

pub const EXPORT_URL_ENV: &str = "VIBENOTE_EXPORT_URL";
pub const HOOK_URL_ENV: &str = "ZAPIER_HOOK_URL";
pub const YOUTUBE_API_KEY_ENV: &str = "YOUTUBE_API_KEY";
pub const CHANNELS_ENV: &str = "VIBENOTE_CHANNELS";

/// Where exports go when nothing else is configured: the local relay.
pub const DEFAULT_EXPORT_URL: &str = "http://127.0.0.1:3000/api/zapier";

#[derive(Clone, Debug)]
pub struct Config {
    pub export_url: String,
    pub hook_url: Option<String>,
    pub youtube_api_key: Option<String>,
    pub channels: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export_url: DEFAULT_EXPORT_URL.to_string(),
            hook_url: None,
            youtube_api_key: None,
            channels: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            export_url: get(EXPORT_URL_ENV).unwrap_or_else(|| DEFAULT_EXPORT_URL.to_string()),
            hook_url: get(HOOK_URL_ENV),
            youtube_api_key: get(YOUTUBE_API_KEY_ENV),
            channels: get(CHANNELS_ENV)
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn require_hook_url(&self) -> Result<&str> {
        self.hook_url
            .as_deref()
            .ok_or_else(|| VibenoteError::MissingConfig {
                env_var: HOOK_URL_ENV.to_string(),
            })
    }
}
