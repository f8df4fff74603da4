use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::{error::Result, types::Note};

pub fn get_root_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vibenote")
}

/// Get the directory holding persisted notes
pub fn get_notes_dir() -> PathBuf {
    get_root_data_dir().join("notes")
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredNotes {
    video_id: String,
    notes: Vec<Note>,
}

/// Keeps one JSON file of notes per video.
#[derive(Clone, Debug)]
pub struct NoteStore {
    root: PathBuf,
}

impl NoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn default_location() -> Self {
        Self::new(get_notes_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the notes file for a video
    pub fn path_for(&self, video_id: &str) -> PathBuf {
        let file_stem: String = video_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", file_stem))
    }

    /// Load saved notes. A video with nothing saved yields an empty list.
    pub async fn load(&self, video_id: &str) -> Result<Vec<Note>> {
        let path = self.path_for(video_id);
        let json_content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredNotes = serde_json::from_str(&json_content)?;
        debug!(video_id, count = stored.notes.len(), "loaded notes");
        Ok(stored.notes)
    }

    pub async fn save(&self, video_id: &str, notes: &[Note]) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        let stored = StoredNotes {
            video_id: video_id.to_string(),
            notes: notes.to_vec(),
        };
        let pretty_json = serde_json::to_string_pretty(&stored)?;
        fs::write(self.path_for(video_id), &pretty_json).await?;
        debug!(video_id, count = notes.len(), "saved notes");
        Ok(())
    }

    pub async fn clear(&self, video_id: &str) -> Result<()> {
        match fs::remove_file(self.path_for(video_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
