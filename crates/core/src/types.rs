use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VibenoteError;

/// Canonical watch URL for a YouTube video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

/// Medium-quality thumbnail URL for a YouTube video id
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", video_id)
}

/// Which provider produced a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoOrigin {
    Youtube,
    Rss,
    Oembed,
}

impl fmt::Display for VideoOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VideoOrigin::Youtube => "youtube",
            VideoOrigin::Rss => "rss",
            VideoOrigin::Oembed => "oembed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    pub source: VideoOrigin,
    pub published_at: DateTime<Utc>,
}

impl VideoDescriptor {
    /// Build a descriptor with the canonical watch URL and default thumbnail.
    pub fn youtube(
        id: impl Into<String>,
        title: impl Into<String>,
        source: VideoOrigin,
        published_at: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        Self {
            url: watch_url(&id),
            thumbnail: thumbnail_url(&id),
            id,
            title: title.into(),
            source,
            published_at,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Visual only: the player stays muted.
    Body,
    /// Audio only: the picture is blacked out.
    Linguistic,
    #[default]
    Full,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 3] = [
        AnalysisMode::Body,
        AnalysisMode::Linguistic,
        AnalysisMode::Full,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Body => "body",
            AnalysisMode::Linguistic => "linguistic",
            AnalysisMode::Full => "full",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisMode::Body => "Body Language",
            AnalysisMode::Linguistic => "Linguistic",
            AnalysisMode::Full => "Full Analysis",
        }
    }

    pub fn is_muted(&self) -> bool {
        matches!(self, AnalysisMode::Body)
    }

    pub fn allows_unmute(&self) -> bool {
        !self.is_muted()
    }

    pub fn hides_video(&self) -> bool {
        matches!(self, AnalysisMode::Linguistic)
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = VibenoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(AnalysisMode::Body),
            "linguistic" => Ok(AnalysisMode::Linguistic),
            "full" => Ok(AnalysisMode::Full),
            other => Err(VibenoteError::validation(format!(
                "unknown analysis mode '{}', expected body, linguistic or full",
                other
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Seconds into the video.
    pub timestamp: f64,
    pub text: String,
    pub mode: AnalysisMode,
}

/// Body posted to the export sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub video_title: String,
    pub video_url: String,
    pub mode: AnalysisMode,
    pub notes: Vec<ExportedNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedNote {
    pub timestamp: f64,
    pub text: String,
}
