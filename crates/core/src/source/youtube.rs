use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    config::YOUTUBE_API_KEY_ENV,
    error::{Result, VibenoteError},
    source::{VideoRequest, VideoSource},
    types::{VideoDescriptor, VideoOrigin},
};

const YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const PROVIDER: &str = "YouTube";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Deserialize, Default)]
struct Thumbnails {
    medium: Option<Thumbnail>,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

fn descriptor(id: String, snippet: Snippet) -> VideoDescriptor {
    let video = VideoDescriptor::youtube(
        id,
        snippet.title,
        VideoOrigin::Youtube,
        snippet.published_at.unwrap_or_else(Utc::now),
    );
    match snippet.thumbnails.medium {
        Some(thumbnail) => video.with_thumbnail(thumbnail.url),
        None => video,
    }
}

/// Parse a `search` response, keeping only items that are videos
pub fn parse_search_response(body: &str) -> Result<Vec<VideoDescriptor>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .filter_map(|item| Some(descriptor(item.id.video_id?, item.snippet)))
        .collect())
}

/// Parse a `videos` response
pub fn parse_videos_response(body: &str) -> Result<Vec<VideoDescriptor>> {
    let response: VideosResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .map(|item| descriptor(item.id, item.snippet))
        .collect())
}

/// Map an error response to `QuotaExceeded` or a provider failure.
pub fn parse_api_error(status: u16, body: &str) -> VibenoteError {
    let Ok(error) = serde_json::from_str::<serde_json::Value>(body) else {
        return VibenoteError::ProviderFailed {
            provider: PROVIDER.to_string(),
            reason: format!("API error: {}", status),
        };
    };

    if error["error"]["errors"][0]["reason"] == "quotaExceeded" {
        return VibenoteError::QuotaExceeded {
            provider: PROVIDER.to_string(),
            partial: Vec::new(),
        };
    }

    VibenoteError::ProviderFailed {
        provider: PROVIDER.to_string(),
        reason: error["error"]["message"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("API error: {}", status)),
    }
}

/// YouTube Data API v3. Needs an API key and is subject to daily quota.
pub struct YouTubeApiSource {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeApiSource {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: YOUTUBE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| VibenoteError::MissingConfig {
                env_var: YOUTUBE_API_KEY_ENV.to_string(),
            })
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(query)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(endpoint, status = status.as_u16(), "YouTube API response");

        if !status.is_success() {
            return Err(parse_api_error(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn channel_videos(
        &self,
        api_key: &str,
        channel_id: &str,
    ) -> Result<Vec<VideoDescriptor>> {
        let body = self
            .get(
                "search",
                &[
                    ("key", api_key),
                    ("channelId", channel_id),
                    ("part", "snippet,id"),
                    ("order", "date"),
                    ("maxResults", "20"),
                ],
            )
            .await?;
        let videos = parse_search_response(&body)?;
        info!(channel_id, count = videos.len(), "fetched channel videos");
        Ok(videos)
    }

    async fn videos_by_id(&self, api_key: &str, ids: &[String]) -> Result<Vec<VideoDescriptor>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let joined = ids.join(",");
        let body = self
            .get("videos", &[("key", api_key), ("id", &joined), ("part", "snippet")])
            .await?;
        parse_videos_response(&body)
    }
}

#[async_trait]
impl VideoSource for YouTubeApiSource {
    fn name(&self) -> &'static str {
        "youtube"
    }

    /// Channel requests stop at the first quota error, handing back what was
    /// already fetched so the caller can fall back; other per-channel
    /// failures are skipped.
    async fn fetch(&self, request: &VideoRequest) -> Result<Vec<VideoDescriptor>> {
        let api_key = self.api_key()?;

        let VideoRequest::Channels(channel_ids) = request else {
            return self.videos_by_id(api_key, &request.video_ids()?).await;
        };

        let mut videos = Vec::new();
        let mut last_error = None;
        for channel_id in channel_ids {
            match self.channel_videos(api_key, channel_id).await {
                Ok(found) => videos.extend(found),
                Err(VibenoteError::QuotaExceeded { provider, .. }) => {
                    warn!(
                        channel_id = %channel_id,
                        kept = videos.len(),
                        "YouTube API quota exceeded"
                    );
                    return Err(VibenoteError::QuotaExceeded {
                        provider,
                        partial: videos,
                    });
                }
                Err(e) => {
                    warn!(channel_id = %channel_id, error = %e, "YouTube API error for channel");
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
