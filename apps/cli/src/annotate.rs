use std::io::ErrorKind;

use anyhow::Result;
use console::style;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;
use vibenote_core::{
    AnalysisMode, AnnotationSession, ExportSink, MarkReceiver, NoteStore, PlaybackClock,
    VideoDescriptor, export_notes, format_note, format_timestamp, mark_channel,
};

use crate::{
    command::{Command, HELP},
    create_spinner,
};

const EXPORT_FAILED: &str =
    "Failed to export notes. Please check your Zapier webhook configuration.";

/// Interactive annotation of one video, driven by stdin lines.
pub struct Annotator {
    session: AnnotationSession,
    clock: PlaybackClock,
    marks: MarkReceiver,
    sink: Box<dyn ExportSink>,
    store: Option<NoteStore>,
}

impl Annotator {
    pub async fn new(
        video: VideoDescriptor,
        mode: AnalysisMode,
        sink: Box<dyn ExportSink>,
        store: Option<NoteStore>,
    ) -> Result<Self> {
        let notes = match &store {
            Some(store) => store.load(&video.id).await?,
            None => Vec::new(),
        };
        let (tx, marks) = mark_channel();

        Ok(Self {
            session: AnnotationSession::with_notes(video, mode, notes),
            clock: PlaybackClock::new(mode, tx),
            marks,
            sink,
            store,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    async fn run_with(&mut self, input: impl AsyncBufRead + Unpin) -> Result<()> {
        self.print_header();

        let mut lines = input.lines();
        loop {
            tokio::select! {
                biased;

                Some(mark) = self.marks.recv() => {
                    match self.session.mark(mark.position) {
                        Ok(mark) => println!(
                            "{} Marked at {}. Type the note, or 'cancel'.",
                            style("●").yellow().bold(),
                            style(format_timestamp(mark.position())).cyan()
                        ),
                        Err(e) => println!("{} {}", style("Error:").red().bold(), e),
                    }
                }

                line = lines.next_line() => {
                    let line = match line {
                        Ok(Some(line)) => line,
                        Ok(None) => break,
                        // The unreadable line is consumed; keep the session alive.
                        Err(e) if e.kind() == ErrorKind::InvalidData => {
                            warn!(error = %e, "skipping unreadable input line");
                            continue;
                        }
                        Err(e) => return Err(e.into()),
                    };
                    if !self.handle(Command::parse(&line)).await? {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Apply one command. Returns `false` when the session should end.
    async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Empty => {}
            Command::Quit => return Ok(false),
            Command::Help => println!("{}", HELP),
            Command::Invalid(reason) => println!("{} {}", style("Error:").red().bold(), reason),
            Command::Play => {
                self.clock.play();
                self.print_status("Playing");
            }
            Command::Pause => {
                self.clock.pause();
                self.print_status("Paused");
            }
            Command::Seek(seconds) => {
                self.clock.seek(seconds);
                self.print_status("Seeked");
            }
            Command::Mark => {
                self.clock.request_mark();
            }
            Command::Cancel => match self.session.cancel() {
                Some(mark) => println!(
                    "{} Dropped mark at {}",
                    style("✓").green().bold(),
                    format_timestamp(mark.position())
                ),
                None => println!("{}", style("Nothing to cancel").dim()),
            },
            Command::Mode(mode) => {
                self.clock.set_mode(mode);
                self.session.set_mode(mode);
                let sound = if self.clock.is_muted() {
                    "(muted)"
                } else {
                    "(sound on)"
                };
                println!(
                    "{} {} {}",
                    style("✓").green().bold(),
                    mode.label(),
                    style(sound).dim()
                );
            }
            Command::Mute => {
                if self.clock.toggle_mute() {
                    let state = if self.clock.is_muted() {
                        "Muted"
                    } else {
                        "Sound on"
                    };
                    println!("{} {}", style("✓").green().bold(), state);
                } else {
                    println!("{}", style("Sound stays off in body language mode").yellow());
                }
            }
            Command::List => self.print_notes(),
            Command::Delete(n) => {
                let id = self.session.notes().get(n - 1).map(|note| note.id);
                match id {
                    Some(id) if self.session.delete_note(id) => {
                        println!("{} Deleted note {}", style("✓").green().bold(), n);
                        self.persist().await;
                    }
                    _ => println!("{} No note number {}", style("Error:").red().bold(), n),
                }
            }
            Command::Export => self.export().await,
            Command::Text(text) => {
                if self.session.pending().is_none() {
                    println!(
                        "{}",
                        style("Use 'mark' first to capture a moment for this note").dim()
                    );
                } else if self.session.submit_text(&text).is_some() {
                    println!(
                        "{} Note added ({} total)",
                        style("✓").green().bold(),
                        self.session.notes().len()
                    );
                    self.persist().await;
                }
            }
        }

        Ok(true)
    }

    async fn export(&mut self) {
        let spinner = create_spinner("Exporting notes...");
        let result = export_notes(
            self.sink.as_ref(),
            self.session.video(),
            self.session.mode(),
            self.session.notes(),
        )
        .await;
        spinner.finish_and_clear();

        match result {
            Ok(true) => println!(
                "{} Exported {} notes",
                style("✓").green().bold(),
                self.session.notes().len()
            ),
            Ok(false) => println!("{} {}", style("Error:").red().bold(), EXPORT_FAILED),
            Err(e) => println!("{} {}", style("Error:").red().bold(), e),
        }
    }

    async fn persist(&self) {
        let Some(store) = &self.store else { return };
        let video_id = &self.session.video().id;
        if let Err(e) = store.save(video_id, self.session.notes()).await {
            warn!(video_id = %video_id, error = %e, "failed to save notes");
        }
    }

    fn print_header(&self) {
        let video = self.session.video();
        println!(
            "\n{}  {}\n{}\n",
            style("vibenote").cyan().bold(),
            style(&video.title).bold(),
            style(&video.url).dim()
        );
        println!("{} {}", style("Mode:").dim(), self.session.mode().label());
        if !self.session.notes().is_empty() {
            println!(
                "{} {} saved notes",
                style("✓").green().bold(),
                self.session.notes().len()
            );
        }
        println!("{}", style("Type 'help' for commands").dim());
        println!("{}", style("─".repeat(60)).dim());
    }

    fn print_status(&self, action: &str) {
        println!(
            "{} {} at {}",
            style("▶").cyan(),
            action,
            format_timestamp(self.clock.position())
        );
    }

    fn print_notes(&self) {
        let notes = self.session.notes();
        if notes.is_empty() {
            println!("{}", style("No notes yet").dim());
            return;
        }
        for (i, note) in notes.iter().enumerate() {
            println!("{:>3}. {}", i + 1, format_note(note));
        }
    }
}
