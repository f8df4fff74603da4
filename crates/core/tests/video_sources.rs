use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use vibenote_core::{
    SourceChain, VibenoteError, VideoRequest, VideoSource,
    source::{OEmbedSource, YouTubeApiSource},
};

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Search endpoint that serves one video for `UCok` and a quota error for
/// every other channel.
async fn search(
    State(hits): State<Arc<AtomicUsize>>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    hits.fetch_add(1, Ordering::SeqCst);
    if query.get("channelId").map(String::as_str) == Some("UCok") {
        return (
            StatusCode::OK,
            Json(json!({
                "items": [{
                    "id": { "kind": "youtube#video", "videoId": "dQw4w9WgXcQ" },
                    "snippet": { "title": "Interview 7", "publishedAt": "2024-05-01T10:00:00Z" }
                }]
            })),
        );
    }
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": { "code": 403, "message": "quota", "errors": [{ "reason": "quotaExceeded" }] }
        })),
    )
}

async fn oembed(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let url = query.get("url").cloned().unwrap_or_default();
    let id = url.rsplit('=').next().unwrap_or_default().to_string();
    Json(json!({ "title": format!("Clip {}", id) }))
}

#[tokio::test]
async fn quota_error_hands_back_earlier_channels() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/search", get(search))
        .with_state(hits.clone());
    let base = spawn(app).await;
    let source = YouTubeApiSource::new(reqwest::Client::new(), Some("key".into()))
        .with_base_url(base);

    let request = VideoRequest::Channels(vec!["UCok".into(), "UCquota".into(), "UCnever".into()]);
    let err = source.fetch(&request).await.unwrap_err();

    let VibenoteError::QuotaExceeded { partial, .. } = err else {
        panic!("expected QuotaExceeded");
    };
    assert_eq!(partial.len(), 1);
    assert_eq!(partial[0].id, "dQw4w9WgXcQ");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn oembed_lookups_keep_request_order() {
    let app = Router::new().route("/oembed", get(oembed));
    let base = spawn(app).await;
    let oembed = OEmbedSource::new(reqwest::Client::new())
        .with_base_url(format!("{}/oembed", base));
    let chain = SourceChain::new().with(oembed);

    let request = VideoRequest::Videos(vec![
        "aaaaaaaaaaa".into(),
        "bbbbbbbbbbb".into(),
        "ccccccccccc".into(),
    ]);
    let videos = chain.fetch(&request).await.unwrap();

    let ids: Vec<_> = videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"]);
    assert_eq!(videos[1].title, "Clip bbbbbbbbbbb");
    let fetched_at = videos[0].published_at;
    assert!(videos.iter().all(|v| v.published_at == fetched_at));
}
