//! Console transport: one JSON document per line.

use crate::application::ports::Transport;
use crate::domain::event::Event;
use crate::error::TransportError;
use crate::infrastructure::transport::document::IngestDocument;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// Writes each event as a JSON line, stdout by default.
pub struct ConsoleTransport {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleTransport {
    /// Write to standard output.
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }

    /// Write to an arbitrary sink.
    pub fn with_writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }
}

impl Default for ConsoleTransport {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Transport for ConsoleTransport {
    fn send(&self, event: &Event) -> Result<(), TransportError> {
        let line = serde_json::to_string(&IngestDocument::from(event))?;

        // A panic mid-write leaves at worst a torn line; keep writing
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Debug for ConsoleTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleTransport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{Fields, Level};
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn event(message: &str) -> Event {
        Event {
            level: Level::Warning,
            service_name: "svc".into(),
            timestamp: Utc::now(),
            message: Some(message.into()),
            error_kind: None,
            error_message: None,
            error_sources: Vec::new(),
            exclude_from_notification: false,
            context: Fields::new(),
            data: Fields::new(),
        }
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let buffer = SharedBuffer::default();
        let transport = ConsoleTransport::with_writer(buffer.clone());

        transport.send(&event("first")).unwrap();
        transport.send(&event("second")).unwrap();

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["message"], "first");
        assert_eq!(lines[1]["level"], "warning");
        assert_eq!(lines[1]["_service"], "svc");
    }

    #[test]
    fn test_write_failure_is_reported() {
        let transport = ConsoleTransport::with_writer(BrokenPipe);

        assert!(matches!(
            transport.send(&event("lost")),
            Err(TransportError::Io(_))
        ));
    }
}
