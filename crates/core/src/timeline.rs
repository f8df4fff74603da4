use tracing::{debug, warn};

use crate::{
    error::{Result, VibenoteError},
    types::{AnalysisMode, Note, NoteId},
};

/// A captured playback position waiting for its note text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingMark {
    position: f64,
}

impl PendingMark {
    pub fn position(&self) -> f64 {
        self.position
    }
}

fn is_valid_timestamp(timestamp: f64) -> bool {
    timestamp.is_finite() && timestamp >= 0.0
}

fn is_restorable(note: &Note) -> bool {
    is_valid_timestamp(note.timestamp) && !note.text.trim().is_empty()
}

/// Notes for the active video, always in ascending timestamp order.
#[derive(Debug, Clone, Default)]
pub struct NoteTimeline {
    notes: Vec<Note>,
}

impl NoteTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a timeline from notes in any order (e.g. loaded from disk).
    pub fn from_notes(mut notes: Vec<Note>) -> Self {
        notes.retain(is_restorable);
        notes.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self { notes }
    }

    /// Capture a position for a later note. Does not touch the timeline.
    pub fn mark(position: f64) -> Result<PendingMark> {
        if !is_valid_timestamp(position) {
            return Err(VibenoteError::validation(format!(
                "mark position must be a finite, non-negative number of seconds, got {}",
                position
            )));
        }
        Ok(PendingMark { position })
    }

    /// Insert a note, keeping timestamp order. Notes sharing a timestamp keep
    /// insertion order. Blank text is ignored and returns `None`.
    pub fn add_note(&mut self, timestamp: f64, text: &str, mode: AnalysisMode) -> Option<&Note> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring blank note");
            return None;
        }
        if !is_valid_timestamp(timestamp) {
            warn!(timestamp, "ignoring note with invalid timestamp");
            return None;
        }

        let index = self
            .notes
            .partition_point(|note| note.timestamp <= timestamp);
        self.notes.insert(
            index,
            Note {
                id: NoteId::new(),
                timestamp,
                text: text.to_string(),
                mode,
            },
        );
        Some(&self.notes[index])
    }

    /// Remove the note with `id`. Unknown ids are a no-op.
    pub fn delete_note(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.id == id)?;
        Some(self.notes.remove(index))
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
