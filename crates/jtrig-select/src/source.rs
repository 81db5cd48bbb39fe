//! Event sources consumed by the fill stage.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use jtrig_core::{ErrorInfo, TrigError, MALFORMED_EVENT};

use crate::event::Event;

fn source_error(code: &str, err: impl ToString, label: &str) -> TrigError {
    TrigError::Source(ErrorInfo::new(code, err.to_string()).with_context("source", label))
}

/// Stream of events produced by [`EventSource::open`].
pub type EventStream<'a> = Box<dyn Iterator<Item = Result<Event, TrigError>> + 'a>;

/// One input unit, typically a file.
///
/// `open` may be called more than once; each call restarts the stream from the first
/// event.
pub trait EventSource {
    /// Name used in logs and reports.
    fn label(&self) -> String;

    /// Opens the source for reading.
    fn open(&self) -> Result<EventStream<'_>, TrigError>;
}

/// Events held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    label: String,
    events: Vec<Event>,
}

impl MemorySource {
    /// Wraps a list of events.
    pub fn new(label: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            label: label.into(),
            events,
        }
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when the source holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSource for MemorySource {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn open(&self) -> Result<EventStream<'_>, TrigError> {
        Ok(Box::new(self.events.iter().cloned().map(Ok)))
    }
}

/// File with one JSON event per line. Blank lines are skipped; a line that does not
/// decode yields a [`MALFORMED_EVENT`] error and the stream continues with the next line.
#[derive(Debug, Clone)]
pub struct JsonLinesSource {
    path: PathBuf,
}

impl JsonLinesSource {
    /// Source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSource for JsonLinesSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> Result<EventStream<'_>, TrigError> {
        let label = self.label();
        let file = File::open(&self.path).map_err(|err| source_error("source_open", err, &label))?;
        let lines = BufReader::new(file).lines().enumerate();
        let stream = lines.filter_map(move |(number, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(serde_json::from_str::<Event>(&line).map_err(|err| {
                TrigError::Source(
                    ErrorInfo::new(MALFORMED_EVENT, err.to_string())
                        .with_context("source", label.clone())
                        .with_context("line", (number + 1).to_string()),
                )
            })),
            Err(err) => Some(Err(source_error("source_read", err, &label))),
        });
        Ok(Box::new(stream))
    }
}

/// Writes events as JSON lines, the format read by [`JsonLinesSource`].
pub fn write_json_lines(path: &Path, events: &[Event]) -> Result<(), TrigError> {
    let label = path.display().to_string();
    let mut out = String::new();
    for event in events {
        let line =
            serde_json::to_string(event).map_err(|err| source_error("source_encode", err, &label))?;
        out.push_str(&line);
        out.push('\n');
    }
    std::fs::write(path, out).map_err(|err| source_error("source_write", err, &label))
}
