//! Simulated playback surface.
//!
//! `PlaybackClock` stands in for a video player: it tracks the playback
//! position against the tokio clock, applies the analysis mode's mute
//! policy, and reports marks through an injected [`MarkSender`].

pub mod marks;

pub use marks::*;

use tokio::time::Instant;
use tracing::debug;

use crate::types::AnalysisMode;

pub struct PlaybackClock {
    mode: AnalysisMode,
    muted: bool,
    offset: f64,
    playing_since: Option<Instant>,
    marks: MarkSender,
}

impl PlaybackClock {
    pub fn new(mode: AnalysisMode, marks: MarkSender) -> Self {
        Self {
            mode,
            muted: mode.is_muted(),
            offset: 0.0,
            playing_since: None,
            marks,
        }
    }

    /// Current position in seconds.
    pub fn position(&self) -> f64 {
        match self.playing_since {
            Some(since) => self.offset + since.elapsed().as_secs_f64(),
            None => self.offset,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    pub fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        self.offset = self.position();
        self.playing_since = None;
    }

    /// Jump to `seconds`. Negative or non-finite targets go to the start.
    pub fn seek(&mut self, seconds: f64) {
        self.offset = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Switch mode. Body mode forces mute; the other modes force sound on.
    pub fn set_mode(&mut self, mode: AnalysisMode) {
        self.mode = mode;
        self.muted = mode.is_muted();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flip mute. Refused (returns `false`) when the mode pins the player muted.
    pub fn toggle_mute(&mut self) -> bool {
        if !self.mode.allows_unmute() {
            return false;
        }
        self.muted = !self.muted;
        true
    }

    /// Pause and report the current position as a mark.
    pub fn request_mark(&mut self) -> f64 {
        self.pause();
        let position = self.position();
        debug!(position, "mark requested");
        self.marks.send(MarkRequested { position });
        position
    }
}
