use crate::stream::LogStream;
use std::io;
use std::sync::{Arc, Mutex};

/// A stream that keeps every emitted line in memory.
///
/// Useful for measuring the overhead of the logger itself without any
/// terminal I/O, and for tests that assert on emitted records. Clones share
/// the same buffer, so a test can hand one clone to the logger and inspect
/// the other.
#[derive(Clone, Default)]
pub struct CaptureStream {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LogStream for CaptureStream {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(line.to_string());
        Ok(())
    }
}
