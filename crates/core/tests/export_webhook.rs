use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::Utc;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use vibenote_core::{
    AnalysisMode, ExportSink, NoteTimeline, VibenoteError, VideoDescriptor, VideoOrigin,
    WebhookSink, build_payload, export_notes, relay,
};

#[derive(Clone, Default)]
struct Captured {
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A sink that records each body and answers with a fixed status and body.
async fn spawn_sink(status: StatusCode, reply: Value) -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/hook",
            post(move |State(captured): State<Captured>, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    captured.hits.fetch_add(1, Ordering::SeqCst);
                    captured.bodies.lock().unwrap().push(body);
                    (status, Json(reply))
                }
            }),
        )
        .with_state(captured.clone());
    let base = spawn(app).await;
    (format!("{}/hook", base), captured)
}

fn video() -> VideoDescriptor {
    VideoDescriptor::youtube("dQw4w9WgXcQ", "Interview 7", VideoOrigin::Youtube, Utc::now())
}

fn timeline() -> NoteTimeline {
    let mut timeline = NoteTimeline::new();
    timeline.add_note(12.5, "raises voice", AnalysisMode::Full);
    timeline.add_note(3.0, "smiles", AnalysisMode::Body);
    timeline.add_note(40.0, "long silence", AnalysisMode::Linguistic);
    timeline
}

#[tokio::test]
async fn success_response_exports_true() {
    let (url, captured) = spawn_sink(StatusCode::OK, json!({ "success": true })).await;
    let sink = WebhookSink::new(url);
    let timeline = timeline();

    let ok = export_notes(&sink, &video(), AnalysisMode::Full, timeline.notes())
        .await
        .unwrap();

    assert!(ok);
    assert_eq!(captured.hits.load(Ordering::SeqCst), 1);
    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(
        bodies[0],
        json!({
            "videoTitle": "Interview 7",
            "videoUrl": "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "mode": "full",
            "notes": [
                { "timestamp": 3.0, "text": "smiles" },
                { "timestamp": 12.5, "text": "raises voice" },
                { "timestamp": 40.0, "text": "long silence" }
            ]
        })
    );
}

#[tokio::test]
async fn success_false_exports_false() {
    let (url, captured) = spawn_sink(StatusCode::OK, json!({ "success": false })).await;
    let sink = WebhookSink::new(url);
    let timeline = timeline();
    let before = timeline.notes().to_vec();

    let ok = export_notes(&sink, &video(), AnalysisMode::Full, timeline.notes())
        .await
        .unwrap();

    assert!(!ok);
    assert_eq!(captured.hits.load(Ordering::SeqCst), 1);
    assert_eq!(timeline.notes(), before.as_slice());
}

#[tokio::test]
async fn missing_success_flag_is_a_transport_error() {
    let (url, _captured) = spawn_sink(StatusCode::OK, json!({ "status": "ok" })).await;
    let sink = WebhookSink::new(url);
    let payload = build_payload(&video(), AnalysisMode::Body, timeline().notes()).unwrap();

    let err = sink.deliver(&payload).await.unwrap_err();

    assert!(matches!(err, VibenoteError::Transport { .. }));
}

#[tokio::test]
async fn server_error_exports_false_without_retry() {
    let (url, captured) = spawn_sink(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "Zapier webhook URL not configured" }),
    )
    .await;
    let sink = WebhookSink::new(url);
    let payload = build_payload(&video(), AnalysisMode::Full, timeline().notes()).unwrap();

    let err = sink.deliver(&payload).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Export delivery failed: Zapier webhook URL not configured"
    );

    let ok = export_notes(&sink, &video(), AnalysisMode::Full, timeline().notes())
        .await
        .unwrap();
    assert!(!ok);
    assert_eq!(captured.hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unreachable_sink_exports_false() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let sink = WebhookSink::new(format!("http://{}/hook", addr));

    let ok = export_notes(&sink, &video(), AnalysisMode::Full, timeline().notes())
        .await
        .unwrap();

    assert!(!ok);
}

#[tokio::test]
async fn empty_timeline_never_reaches_the_sink() {
    let (url, captured) = spawn_sink(StatusCode::OK, json!({ "success": true })).await;
    let sink = WebhookSink::new(url);

    let err = export_notes(&sink, &video(), AnalysisMode::Full, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, VibenoteError::Validation { .. }));
    assert_eq!(captured.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn relay_forwards_payload_unchanged() {
    let reply = json!({ "status": "success" });
    let (hook_url, captured) = spawn_sink(StatusCode::OK, reply).await;
    let relay_base = spawn(relay::router(Some(hook_url))).await;
    let sink = WebhookSink::new(format!("{}{}", relay_base, relay::RELAY_PATH));
    let timeline = timeline();

    let ok = export_notes(&sink, &video(), AnalysisMode::Linguistic, timeline.notes())
        .await
        .unwrap();

    assert!(ok);
    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let payload = build_payload(&video(), AnalysisMode::Linguistic, timeline.notes());
    let expected = serde_json::to_value(payload.unwrap()).unwrap();
    assert_eq!(bodies[0], expected);
}

#[tokio::test]
async fn relay_reports_hook_status() {
    let (hook_url, _captured) = spawn_sink(StatusCode::NOT_FOUND, json!({})).await;
    let relay_base = spawn(relay::router(Some(hook_url))).await;

    let payload = json!({ "videoTitle": "t", "videoUrl": "u", "mode": "full", "notes": [] });
    let response = reqwest::Client::new()
        .post(format!("{}{}", relay_base, relay::RELAY_PATH))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Zapier responded with status: 404");
}

#[tokio::test]
async fn relay_without_hook_url_fails() {
    let relay_base = spawn(relay::router(None)).await;
    let sink = WebhookSink::new(format!("{}{}", relay_base, relay::RELAY_PATH));
    let payload = build_payload(&video(), AnalysisMode::Full, timeline().notes()).unwrap();

    let err = sink.deliver(&payload).await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Export delivery failed: Zapier webhook URL not configured"
    );
}

#[tokio::test]
async fn relay_rejects_unreadable_body() {
    let (hook_url, captured) = spawn_sink(StatusCode::OK, json!({})).await;
    let relay_base = spawn(relay::router(Some(hook_url))).await;

    let response = reqwest::Client::new()
        .post(format!("{}{}", relay_base, relay::RELAY_PATH))
        .body("not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to process request");
    assert_eq!(captured.hits.load(Ordering::SeqCst), 0);
}
