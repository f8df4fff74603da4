use crate::types::Note;

/// Format seconds as M:SS, truncating fractional seconds
pub fn format_timestamp(seconds: f64) -> String {
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}

/// Format one note as `[M:SS] (mode) text`
pub fn format_note(note: &Note) -> String {
    format!(
        "[{}] ({}) {}",
        format_timestamp(note.timestamp),
        note.mode,
        note.text.trim()
    )
}

pub fn format_timeline(notes: &[Note]) -> String {
    notes.iter().map(format_note).collect::<Vec<_>>().join("\n")
}
