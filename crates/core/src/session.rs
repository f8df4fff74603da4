use tracing::debug;

use crate::{
    error::Result,
    export::build_payload,
    timeline::{NoteTimeline, PendingMark},
    types::{AnalysisMode, ExportPayload, Note, NoteId, VideoDescriptor},
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MarkState {
    #[default]
    Idle,
    AwaitingText(PendingMark),
}

/// Annotation state for the video currently being watched.
pub struct AnnotationSession {
    video: VideoDescriptor,
    mode: AnalysisMode,
    timeline: NoteTimeline,
    state: MarkState,
}

impl AnnotationSession {
    pub fn new(video: VideoDescriptor, mode: AnalysisMode) -> Self {
        Self::with_notes(video, mode, Vec::new())
    }

    pub fn with_notes(video: VideoDescriptor, mode: AnalysisMode, notes: Vec<Note>) -> Self {
        Self {
            video,
            mode,
            timeline: NoteTimeline::from_notes(notes),
            state: MarkState::Idle,
        }
    }

    /// Capture `position` for the next note. A newer mark replaces an
    /// unanswered one.
    pub fn mark(&mut self, position: f64) -> Result<PendingMark> {
        let mark = NoteTimeline::mark(position)?;
        if let MarkState::AwaitingText(previous) = self.state {
            debug!(
                previous = previous.position(),
                position,
                "replacing pending mark"
            );
        }
        self.state = MarkState::AwaitingText(mark);
        Ok(mark)
    }

    /// Turn the pending mark into a note stamped with the current mode.
    ///
    /// Returns `None` with no pending mark or blank text; blank text keeps
    /// the mark pending.
    pub fn submit_text(&mut self, text: &str) -> Option<NoteId> {
        let MarkState::AwaitingText(mark) = self.state else {
            return None;
        };
        let id = self
            .timeline
            .add_note(mark.position(), text, self.mode)?
            .id;
        self.state = MarkState::Idle;
        Some(id)
    }

    pub fn cancel(&mut self) -> Option<PendingMark> {
        match std::mem::take(&mut self.state) {
            MarkState::AwaitingText(mark) => Some(mark),
            MarkState::Idle => None,
        }
    }

    pub fn delete_note(&mut self, id: NoteId) -> bool {
        self.timeline.delete_note(id).is_some()
    }

    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
    }

    /// Make `video` active. Notes and any pending mark are discarded.
    pub fn switch_video(&mut self, video: VideoDescriptor) {
        debug!(from = %self.video.id, to = %video.id, "switching video");
        self.video = video;
        self.timeline.clear();
        self.state = MarkState::Idle;
    }

    pub fn export_payload(&self) -> Result<ExportPayload> {
        build_payload(&self.video, self.mode, self.timeline.notes())
    }

    pub fn pending(&self) -> Option<PendingMark> {
        match self.state {
            MarkState::AwaitingText(mark) => Some(mark),
            MarkState::Idle => None,
        }
    }

    pub fn state(&self) -> MarkState {
        self.state
    }

    pub fn video(&self) -> &VideoDescriptor {
        &self.video
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    pub fn timeline(&self) -> &NoteTimeline {
        &self.timeline
    }

    pub fn notes(&self) -> &[Note] {
        self.timeline.notes()
    }
}
