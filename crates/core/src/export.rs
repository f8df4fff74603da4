use async_trait::async_trait;
use tracing::{error, info};

use crate::{
    error::{Result, VibenoteError},
    types::{AnalysisMode, ExportPayload, ExportedNote, Note, VideoDescriptor, watch_url},
};

/// Destination for exported notes. One call is one delivery attempt.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn deliver(&self, payload: &ExportPayload) -> Result<()>;
}

/// Validate the export preconditions and snapshot the notes into a payload.
pub fn build_payload(
    video: &VideoDescriptor,
    mode: AnalysisMode,
    notes: &[Note],
) -> Result<ExportPayload> {
    if video.id.trim().is_empty() || video.title.trim().is_empty() {
        return Err(VibenoteError::validation("invalid video data"));
    }
    if notes.is_empty() {
        return Err(VibenoteError::validation("no notes to export"));
    }

    Ok(ExportPayload {
        video_title: video.title.clone(),
        video_url: watch_url(&video.id),
        mode,
        notes: notes
            .iter()
            .map(|note| ExportedNote {
                timestamp: note.timestamp,
                text: note.text.clone(),
            })
            .collect(),
    })
}

/// Export the notes to `sink`.
///
/// Precondition failures are returned as `Validation` errors before any
/// delivery is attempted. Delivery failures are logged and reported as
/// `Ok(false)`; there is no retry.
pub async fn export_notes(
    sink: &dyn ExportSink,
    video: &VideoDescriptor,
    mode: AnalysisMode,
    notes: &[Note],
) -> Result<bool> {
    let payload = build_payload(video, mode, notes)?;

    info!(
        video_title = %payload.video_title,
        video_url = %payload.video_url,
        mode = %payload.mode,
        note_count = payload.notes.len(),
        "exporting notes"
    );

    match sink.deliver(&payload).await {
        Ok(()) => {
            info!(video_url = %payload.video_url, "notes exported");
            Ok(true)
        }
        Err(e) => {
            error!(error = %e, "failed to export notes");
            Ok(false)
        }
    }
}
