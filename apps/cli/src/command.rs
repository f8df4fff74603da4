use vibenote_core::AnalysisMode;

/// One line of input in an annotation session.
#[derive(Debug, PartialEq)]
pub enum Command {
    Play,
    Pause,
    Seek(f64),
    Mark,
    Cancel,
    Mode(AnalysisMode),
    Mute,
    List,
    Delete(usize),
    Export,
    Help,
    Quit,
    /// Anything that is not a command is note text, including lines that
    /// start with a command word but carry no valid argument.
    Text(String),
    Empty,
    Invalid(String),
}

pub const HELP: &str = "\
  play | pause        control playback
  seek <seconds>      jump to a position
  mark                capture the current position, then type the note
  cancel              drop the pending mark
  mode <m>            body | linguistic | full
  mute                toggle sound (not allowed in body mode)
  list                show notes in time order
  delete <n>          delete note number n from the list
  export              send the notes to the webhook
  help | quit";

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_ascii_lowercase().as_str(), rest) {
            ("play", "") => Command::Play,
            ("pause", "") => Command::Pause,
            ("mark", "") => Command::Mark,
            ("cancel", "") => Command::Cancel,
            ("mute", "") => Command::Mute,
            ("list", "") => Command::List,
            ("export", "") => Command::Export,
            ("help", "") => Command::Help,
            ("quit" | "exit", "") => Command::Quit,
            ("seek", "") => Command::Invalid("seek needs a number of seconds".to_string()),
            ("seek", arg) => match arg.parse::<f64>() {
                Ok(seconds) if seconds.is_finite() => Command::Seek(seconds),
                _ => Command::Text(line.to_string()),
            },
            ("mode", "") => Command::Invalid("mode needs body, linguistic or full".to_string()),
            ("mode", arg) => match arg.parse::<AnalysisMode>() {
                Ok(mode) => Command::Mode(mode),
                Err(_) => Command::Text(line.to_string()),
            },
            ("delete", "") => Command::Invalid("delete needs a note number".to_string()),
            ("delete", arg) => match arg.parse::<usize>() {
                Ok(0) => Command::Invalid("notes are numbered from 1".to_string()),
                Ok(n) => Command::Delete(n),
                Err(_) => Command::Text(line.to_string()),
            },
            _ => Command::Text(line.to_string()),
        }
    }
}
