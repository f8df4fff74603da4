//! Vibenote Core Library
//!
//! Timestamped notes on video playback: a time-ordered note timeline, the
//! mark/annotate session around it, and export of the annotated timeline to
//! an automation webhook.

pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod playback;
pub mod relay;
pub mod session;
pub mod source;
pub mod store;
pub mod timeline;
pub mod types;
pub mod webhook;

// Re-export commonly used items at crate root
pub use config::Config;
pub use error::{Result, VibenoteError};
pub use export::{ExportSink, build_payload, export_notes};
pub use format::{format_note, format_timeline, format_timestamp};
pub use playback::{MarkReceiver, MarkRequested, MarkSender, PlaybackClock, mark_channel};
pub use session::{AnnotationSession, MarkState};
pub use source::{SourceChain, VideoRequest, VideoSource, extract_video_id};
pub use store::NoteStore;
pub use timeline::{NoteTimeline, PendingMark};
pub use types::{
    AnalysisMode, ExportPayload, ExportedNote, Note, NoteId, VideoDescriptor, VideoOrigin,
};
pub use webhook::WebhookSink;
