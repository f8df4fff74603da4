use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::{
    error::{Result, VibenoteError},
    source::{VideoRequest, VideoSource},
    types::{VideoDescriptor, VideoOrigin, watch_url},
};

const OEMBED_URL: &str = "https://www.youtube.com/oembed";

#[derive(Deserialize)]
struct OEmbedResponse {
    title: String,
    thumbnail_url: Option<String>,
}

/// Keyless title/thumbnail lookup for known video ids. Publish dates are
/// not available, so every descriptor from one fetch shares the lookup
/// time and newest-first sorting keeps request order.
pub struct OEmbedSource {
    client: reqwest::Client,
    base_url: String,
}

impl OEmbedSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: OEMBED_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn lookup(&self, video_id: &str, fetched_at: DateTime<Utc>) -> Result<VideoDescriptor> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("url", watch_url(video_id).as_str()), ("format", "json")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VibenoteError::ProviderFailed {
                provider: "oEmbed".to_string(),
                reason: format!(
                    "lookup for {} responded with status: {}",
                    video_id,
                    status.as_u16()
                ),
            });
        }

        let body: OEmbedResponse = response.json().await?;
        let descriptor =
            VideoDescriptor::youtube(video_id, body.title, VideoOrigin::Oembed, fetched_at);
        Ok(match body.thumbnail_url {
            Some(url) => descriptor.with_thumbnail(url),
            None => descriptor,
        })
    }
}

#[async_trait]
impl VideoSource for OEmbedSource {
    fn name(&self) -> &'static str {
        "oembed"
    }

    async fn fetch(&self, request: &VideoRequest) -> Result<Vec<VideoDescriptor>> {
        if matches!(request, VideoRequest::Channels(_)) {
            return Err(VibenoteError::UnsupportedRequest {
                provider: "oEmbed".to_string(),
            });
        }

        let fetched_at = Utc::now();
        let mut videos = Vec::new();
        let mut last_error = None;
        for id in request.video_ids()? {
            match self.lookup(&id, fetched_at).await {
                Ok(video) => videos.push(video),
                Err(e) => {
                    warn!(video_id = %id, error = %e, "oEmbed lookup failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if videos.is_empty() => Err(e),
            _ => Ok(videos),
        }
    }
}
