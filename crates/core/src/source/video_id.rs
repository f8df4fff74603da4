use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, VibenoteError};

static WATCH_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:youtu\.be/|youtube\.com/(?:embed/|v/|watch\?v=|watch\?.+&v=))([^"&?/\s]{11})"#)
        .unwrap_or_else(|e| panic!("video url pattern: {e}"))
});

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap_or_else(|e| panic!("video id pattern: {e}"))
});

/// Pull the 11-character video id out of a YouTube link or a bare id.
pub fn extract_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if BARE_ID.is_match(input) {
        return Ok(input.to_string());
    }
    WATCH_URL
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| VibenoteError::InvalidVideoUrl {
            url: input.to_string(),
        })
}
