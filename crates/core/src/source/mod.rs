//! Video descriptor lookup.
//!
//! Each provider implements [`VideoSource`]. A [`SourceChain`] asks its
//! providers in order and returns the first non-empty result, newest first.

pub mod feed;
pub mod oembed;
pub mod video_id;
pub mod youtube;

pub use feed::FeedSource;
pub use oembed::OEmbedSource;
pub use video_id::extract_video_id;
pub use youtube::YouTubeApiSource;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{Result, VibenoteError},
    types::VideoDescriptor,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoRequest {
    Channels(Vec<String>),
    Videos(Vec<String>),
    Url(String),
}

impl VideoRequest {
    /// Video ids named by the request. Channel requests name none.
    pub fn video_ids(&self) -> Result<Vec<String>> {
        match self {
            VideoRequest::Channels(_) => Ok(Vec::new()),
            VideoRequest::Videos(ids) => Ok(ids.clone()),
            VideoRequest::Url(url) => Ok(vec![extract_video_id(url)?]),
        }
    }
}

#[async_trait]
pub trait VideoSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, request: &VideoRequest) -> Result<Vec<VideoDescriptor>>;
}

pub fn sort_newest_first(videos: &mut [VideoDescriptor]) {
    videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

#[derive(Default)]
pub struct SourceChain {
    sources: Vec<Box<dyn VideoSource>>,
}

impl SourceChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl VideoSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// YouTube Data API first, then channel feeds, then oEmbed.
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::new();
        let youtube = YouTubeApiSource::new(client.clone(), config.youtube_api_key.clone());
        Self::new()
            .with(youtube)
            .with(FeedSource::new(client.clone()))
            .with(OEmbedSource::new(client))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Try each source in order until one returns videos. Videos a source
    /// fetched before running out of quota are kept and merged with the
    /// fallback's results.
    pub async fn fetch(&self, request: &VideoRequest) -> Result<Vec<VideoDescriptor>> {
        let mut collected = Vec::new();
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.fetch(request).await {
                Ok(videos) if !videos.is_empty() => {
                    collected.extend(videos);
                    sort_newest_first(&mut collected);
                    info!(
                        source = source.name(),
                        count = collected.len(),
                        "fetched videos"
                    );
                    return Ok(collected);
                }
                Ok(_) => {
                    info!(source = source.name(), "no videos, trying next source");
                    failures.push(format!("{}: no videos found.", source.name()));
                }
                Err(VibenoteError::QuotaExceeded { provider, partial }) => {
                    warn!(
                        source = source.name(),
                        kept = partial.len(),
                        "quota exceeded, trying next source"
                    );
                    let reason = format!("{} API quota exceeded", provider);
                    failures.push(format!("{}: {}.", source.name(), reason));
                    collected.extend(partial);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "source failed, trying next source");
                    failures.push(format!("{}: {}.", source.name(), e));
                }
            }
        }

        if !collected.is_empty() {
            sort_newest_first(&mut collected);
            info!(
                count = collected.len(),
                "returning videos fetched before quota ran out"
            );
            return Ok(collected);
        }

        let mut reason = String::from("No videos found from any source.");
        for failure in failures {
            reason.push(' ');
            reason.push_str(&failure);
        }
        Err(VibenoteError::SourceUnavailable { reason })
    }
}
