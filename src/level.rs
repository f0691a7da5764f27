use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Severity levels in ascending order of importance.
///
/// The numeric codes mirror the wire convention downstream consumers already
/// index on (trace=10 .. fatal=60). [`Level::Silent`] is an upper-bound
/// sentinel: it is a valid minimum level that suppresses all emission, but no
/// record is ever emitted at it.
///
/// Records always carry the lowercase label, never the numeric code; the
/// emitter serializes [`Level`] through [`Level::as_str`] so no
/// post-serialization rewrite pass is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Silent,
}

impl Level {
    /// Canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Silent => "silent",
        }
    }

    /// Numeric severity code.
    pub fn code(self) -> u8 {
        match self {
            Level::Trace => 10,
            Level::Debug => 20,
            Level::Info => 30,
            Level::Warn => 40,
            Level::Error => 50,
            Level::Fatal => 60,
            Level::Silent => u8::MAX,
        }
    }

    /// Look up a level by its numeric code. The silent sentinel has no code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            10 => Some(Level::Trace),
            20 => Some(Level::Debug),
            30 => Some(Level::Info),
            40 => Some(Level::Warn),
            50 => Some(Level::Error),
            60 => Some(Level::Fatal),
            _ => None,
        }
    }

    /// All levels a record can be emitted at.
    pub const EMITTABLE: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A level string that is none of the known labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level {0:?}")]
pub struct LevelParseError(pub String);

impl FromStr for Level {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "silent" => Ok(Level::Silent),
            _ => Err(LevelParseError(s.to_string())),
        }
    }
}
