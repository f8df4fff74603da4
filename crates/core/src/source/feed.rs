use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};
use tracing::{debug, info, warn};

use crate::{
    error::{Result, VibenoteError},
    source::{VideoRequest, VideoSource, extract_video_id},
    types::{VideoDescriptor, VideoOrigin},
};

pub const FEED_URL: &str = "https://www.youtube.com/feeds/videos.xml";

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, name)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_entry(entry: Node<'_, '_>) -> Option<VideoDescriptor> {
    let title = child_text(entry, "title").unwrap_or_default();

    // Atom puts the link in an attribute, RSS in the element text.
    let link = child(entry, "link")
        .and_then(|link| link.attribute("href").or_else(|| link.text()))
        .unwrap_or_default();

    let id = match child_text(entry, "videoId") {
        Some(id) => id.to_string(),
        None => match extract_video_id(link) {
            Ok(id) => id,
            Err(_) => {
                debug!(title, "skipping feed entry without a video id");
                return None;
            }
        },
    };

    let published_at = child_text(entry, "published")
        .or_else(|| child_text(entry, "pubDate"))
        .and_then(parse_published)
        .unwrap_or_else(Utc::now);

    let thumbnail = entry
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "thumbnail")
        .and_then(|n| n.attribute("url"));

    let video = VideoDescriptor::youtube(id, title, VideoOrigin::Rss, published_at);
    Some(match thumbnail {
        Some(url) => video.with_thumbnail(url),
        None => video,
    })
}

/// Parse an Atom or RSS video feed
/// Atom `<entry>` or RSS `<item>`
fn is_entry(node: &Node) -> bool {
    node.is_element() && matches!(node.tag_name().name(), "entry" | "item")
}

pub fn parse_feed(xml: &str) -> Result<Vec<VideoDescriptor>> {
    let doc = Document::parse(xml).map_err(|e| VibenoteError::FeedParse {
        reason: e.to_string(),
    })?;

    let videos: Vec<_> = doc
        .descendants()
        .filter(is_entry)
        .filter_map(parse_entry)
        .collect();

    debug!(count = videos.len(), "parsed feed");
    Ok(videos)
}

/// Public channel feeds. No key or quota, but only the latest ~15 uploads.
pub struct FeedSource {
    client: reqwest::Client,
    base_url: String,
}

impl FeedSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: FEED_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Feed URL for a channel id
    pub fn channel_feed_url(&self, channel_id: &str) -> String {
        format!("{}?channel_id={}", self.base_url, channel_id)
    }

    async fn fetch_feed(&self, url: &str) -> Result<Vec<VideoDescriptor>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VibenoteError::ProviderFailed {
                provider: "RSS".to_string(),
                reason: format!("feed responded with status: {}", status.as_u16()),
            });
        }
        let body = response.text().await?;
        parse_feed(&body)
    }
}

#[async_trait]
impl VideoSource for FeedSource {
    fn name(&self) -> &'static str {
        "rss"
    }

    async fn fetch(&self, request: &VideoRequest) -> Result<Vec<VideoDescriptor>> {
        let urls: Vec<String> = match request {
            VideoRequest::Channels(ids) => ids.iter().map(|id| self.channel_feed_url(id)).collect(),
            VideoRequest::Url(url) if url.contains("/feeds/") => vec![url.clone()],
            _ => {
                return Err(VibenoteError::UnsupportedRequest {
                    provider: "RSS".to_string(),
                });
            }
        };

        let mut videos = Vec::new();
        let mut last_error = None;
        for url in &urls {
            match self.fetch_feed(url).await {
                Ok(found) => {
                    info!(url = %url, count = found.len(), "fetched feed");
                    videos.extend(found);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "failed to fetch feed");
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

#[cfg(test)]
mod tests {
    use super::*;

    const ATOM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
 <title>Channel</title>
 <entry>
  <id>yt:video:dQw4w9WgXcQ</id>
  <yt:videoId>dQw4w9WgXcQ</yt:videoId>
  <title>Interview &amp; analysis</title>
  <link rel="alternate" href="https://www.youtube.com/watch?v=dQw4w9WgXcQ"/>
  <published>2024-02-10T08:30:00+00:00</published>
  <media:group>
   <media:thumbnail url="https://i4.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg" width="480" height="360"/>
  </media:group>
 </entry>
 <entry>
  <title>Link only</title>
  <link rel="alternate" href="https://youtu.be/abcdefghijk"/>
 </entry>
 <entry>
  <title>Not a video</title>
  <link rel="alternate" href="https://example.com/post/1"/>
 </entry>
</feed>"#;

    #[test]
    fn parses_atom_entries() {
        let videos = parse_feed(ATOM).unwrap();

        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "dQw4w9WgXcQ");
        assert_eq!(videos[0].title, "Interview & analysis");
        assert_eq!(videos[0].source, VideoOrigin::Rss);
        assert_eq!(
            videos[0].thumbnail,
            "https://i4.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );
        assert_eq!(
            videos[0].published_at.to_rfc3339(),
            "2024-02-10T08:30:00+00:00"
        );
        assert_eq!(videos[1].id, "abcdefghijk");
        assert_eq!(videos[1].url, "https://www.youtube.com/watch?v=abcdefghijk");
    }

    #[test]
    fn parses_rss_items() {
        let rss = r#"<rss version="2.0"><channel>
          <item>
            <title>Clip</title>
            <link>https://www.youtube.com/watch?v=abcdefghijk</link>
            <pubDate>Tue, 05 Mar 2024 14:00:00 GMT</pubDate>
          </item>
        </channel></rss>"#;

        let videos = parse_feed(rss).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "abcdefghijk");
        assert_eq!(
            videos[0].published_at.to_rfc3339(),
            "2024-03-05T14:00:00+00:00"
        );
    }

    #[test]
    fn malformed_xml_is_a_parse_error() {
        assert!(matches!(
            parse_feed("<feed><entry>"),
            Err(VibenoteError::FeedParse { .. })
        ));
    }

    #[test]
    fn channel_feed_url_format() {
        let source = FeedSource::new(reqwest::Client::new());
        assert_eq!(
            source.channel_feed_url("UC0MONMWgmyh2dSgfTZvdXhg"),
            "https://www.youtube.com/feeds/videos.xml?channel_id=UC0MONMWgmyh2dSgfTZvdXhg"
        );

        let local = source.with_base_url("http://127.0.0.1:8080/feed");
        assert_eq!(
            local.channel_feed_url("UC1"),
            "http://127.0.0.1:8080/feed?channel_id=UC1"
        );
    }

    #[tokio::test]
    async fn video_requests_are_unsupported() {
        let source = FeedSource::new(reqwest::Client::new());
        let err = source
            .fetch(&VideoRequest::Videos(vec!["abcdefghijk".into()]))
            .await
            .unwrap_err();
        assert!(matches!(err, VibenoteError::UnsupportedRequest { .. }));
    }
}
