//! Destination write targets for serialized records.
//!
//! Production gets a minimal pass-through to stdout, one line per record.
//! Development gets a colorized multi-line rendering of the same logical
//! record. The exact pretty layout is not a compatibility surface.

use crate::env::RuntimeContext;
use nu_ansi_term::{Color, Style};
use serde_json::Value;
use std::io::{self, Write};
use std::sync::Once;

/// Synchronous destination for serialized log records.
///
/// **Parameters**
/// - `line`: one complete serialized record, without a trailing newline.
///
/// **Returns**
/// - `Ok(())` once the line has been handed to the underlying stream.
/// - `Err(..)` if the platform write failed. Callers report and continue;
///   a failed log write never takes the process down.
pub trait LogStream: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Production stream: forwards each record verbatim to stdout.
///
/// No buffering beyond what the OS stream provides, no batching, no
/// backpressure handling. Stdout's own line buffering flushes on the
/// newline appended here.
pub struct JsonStream {
    out: io::Stdout,
}

impl JsonStream {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for JsonStream {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStream for JsonStream {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut lock = self.out.lock();
        lock.write_all(line.as_bytes())?;
        lock.write_all(b"\n")
    }
}

/// Development stream: reformats each JSON record into a colorized,
/// multi-line human rendering before forwarding to stdout.
pub struct PrettyStream {
    out: io::Stdout,
}

impl PrettyStream {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for PrettyStream {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStream for PrettyStream {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let rendered = render_pretty(line);
        let mut lock = self.out.lock();
        lock.write_all(rendered.as_bytes())?;
        lock.flush()
    }
}

fn level_style(label: &str) -> Style {
    match label {
        "trace" => Style::new().dimmed(),
        "debug" => Color::Blue.normal(),
        "info" => Color::Green.normal(),
        "warn" => Color::Yellow.normal(),
        "error" => Color::Red.normal(),
        "fatal" => Color::Red.bold(),
        _ => Style::new(),
    }
}

/// Render one serialized record for humans. Lines that fail to parse as a
/// JSON object are forwarded untouched.
fn render_pretty(line: &str) -> String {
    let Ok(Value::Object(mut record)) = serde_json::from_str::<Value>(line) else {
        return format!("{line}\n");
    };

    let time = record
        .remove("time")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    let label = record
        .remove("level")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "info".to_string());
    let message = record
        .remove("message")
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    record.remove("pid");
    record.remove("hostname");

    let mut out = format!(
        "{} {} {}\n",
        Style::new().dimmed().paint(time),
        level_style(&label).paint(format!("{:>5}", label.to_uppercase())),
        message,
    );

    for (key, value) in record {
        let body = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        let indented = body.replace('\n', "\n    ");
        out.push_str(&format!(
            "    {}: {}\n",
            Color::Cyan.paint(key),
            Style::new().dimmed().paint(indented),
        ));
    }
    out
}

/// Choose the destination stream for the given runtime context.
pub fn select_stream(ctx: &RuntimeContext) -> Box<dyn LogStream> {
    if ctx.is_production {
        Box::new(JsonStream::new())
    } else {
        Box::new(PrettyStream::new())
    }
}

static STDOUT_BLOCKING: Once = Once::new();

/// Force stdout into blocking mode.
///
/// Short-lived serverless executions can exit before a non-blocking stdout
/// drains, truncating the final log lines. Called once before any write when
/// serverless execution is detected; repeated calls are no-ops.
pub fn force_blocking_stdout() {
    STDOUT_BLOCKING.call_once(clear_nonblock);
}

#[cfg(unix)]
fn clear_nonblock() {
    // Failure here leaves stdout as-is; logging still works, at the risk of
    // truncation on abrupt exit.
    unsafe {
        let flags = libc::fcntl(libc::STDOUT_FILENO, libc::F_GETFL);
        if flags >= 0 && flags & libc::O_NONBLOCK != 0 {
            let _ = libc::fcntl(libc::STDOUT_FILENO, libc::F_SETFL, flags & !libc::O_NONBLOCK);
        }
    }
}

#[cfg(not(unix))]
fn clear_nonblock() {}
