//! JSONL event log.
//!
//! Writes one JSON object per [`GameEvent`] to any `Write` destination
//! (stdout, file, pipe). Each line carries a `type` tag, so the log can be
//! filtered with standard tools:
//!
//! ```text
//! jq 'select(.type == "planet_captured")' events.jsonl
//! ```

use super::{GameObserver, ObserverError};
use crate::events::GameEvent;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

pub struct EventLogObserver {
    writer: Mutex<Box<dyn Write + Send>>,
    /// Flush after every line instead of only at shutdown.
    line_buffered: bool,
}

impl EventLogObserver {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout())).line_buffered()
    }

    /// Create (or truncate) a log file.
    pub fn file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(BufWriter::new(file))))
    }

    /// Accepts any `Write + Send` implementor.
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            line_buffered: false,
        }
    }

    pub fn line_buffered(mut self) -> Self {
        self.line_buffered = true;
        self
    }

    fn write_event(&self, writer: &mut dyn Write, event: &GameEvent) -> Result<(), ObserverError> {
        serde_json::to_writer(&mut *writer, event)?;
        writer.write_all(b"\n")?;
        if self.line_buffered {
            writer.flush()?;
        }
        Ok(())
    }
}

impl GameObserver for EventLogObserver {
    fn on_event(&self, event: &GameEvent) -> Result<(), ObserverError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| ObserverError::Poisoned("EventLogObserver writer lock".into()))?;
        self.write_event(&mut **writer, event)
    }

    fn name(&self) -> &str {
        "EventLogObserver"
    }

    fn on_shutdown(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writer.flush() {
                log::warn!("Failed to flush event log: {}", e);
            }
        }
    }
}
