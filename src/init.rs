//! Logger construction.
//!
//! [`create_logger`] is the zero-argument entry point: it captures the
//! environment once, classifies the runtime context, prepares stdout for
//! short-lived serverless executions, selects the destination stream, and
//! binds the static metadata. [`build_logger`] is the injectable seam the
//! test suites use with a synthetic [`Environment`] and a capture stream.

use crate::env::{Environment, RuntimeContext, LOG_LEVEL_VAR};
use crate::level::Level;
use crate::logger::Logger;
use crate::metadata::static_metadata;
use crate::stream::{force_blocking_stdout, select_stream, LogStream};

/// Emitter configuration, fixed once per construction.
///
/// Only the minimum level varies; the rest of the emitter contract is
/// deliberately constant so downstream consumers get a stable schema: the
/// message key is `"message"`, timestamps are ISO-8601 wall-clock time
/// (slower than an epoch counter, chosen for readability — logging is not
/// the hot path), and levels serialize as lowercase labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    pub min_level: Level,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Info,
        }
    }
}

impl LoggerConfig {
    /// Read the minimum level from the override variable.
    ///
    /// The documented default is `info`; an absent or unparseable override
    /// falls back to it rather than failing construction.
    pub fn from_env(env: &Environment) -> Self {
        let min_level = env
            .get(LOG_LEVEL_VAR)
            .and_then(|value| value.parse().ok())
            .unwrap_or(Level::Info);
        Self { min_level }
    }
}

/// Build a ready-to-use logger from the current process environment.
///
/// **Effects**
///
/// When serverless execution is detected, stdout is forced into blocking
/// mode before any line can be written (once per process, idempotent).
/// Construction itself cannot fail: stdout is always available, and a
/// malformed level override falls back to the default.
pub fn create_logger() -> Logger {
    let env = Environment::capture();
    let ctx = RuntimeContext::from_env(&env);
    if ctx.is_serverless {
        force_blocking_stdout();
    }
    build_logger(&env, select_stream(&ctx))
}

/// Build a logger for the given snapshot and destination stream.
///
/// **Parameters**
/// - `env`: captured (or synthetic) environment snapshot.
/// - `stream`: destination for serialized records.
///
/// Performs no stdout side effects; callers that want the serverless
/// blocking-mode preparation go through [`create_logger`].
pub fn build_logger(env: &Environment, stream: Box<dyn LogStream>) -> Logger {
    let ctx = RuntimeContext::from_env(env);
    let config = LoggerConfig::from_env(env);
    let metadata = static_metadata(env, &ctx);
    Logger::new(config, metadata, stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_minimum_level_is_info() {
        assert_eq!(LoggerConfig::default().min_level, Level::Info);
        assert_eq!(
            LoggerConfig::from_env(&Environment::default()).min_level,
            Level::Info
        );
    }

    #[test]
    fn override_variable_sets_minimum_level() {
        let env = Environment::from_iter([(LOG_LEVEL_VAR, "debug")]);
        assert_eq!(LoggerConfig::from_env(&env).min_level, Level::Debug);

        let silent = Environment::from_iter([(LOG_LEVEL_VAR, "silent")]);
        assert_eq!(LoggerConfig::from_env(&silent).min_level, Level::Silent);
    }

    #[test]
    fn unparseable_override_falls_back_to_default() {
        let env = Environment::from_iter([(LOG_LEVEL_VAR, "loudest")]);
        assert_eq!(LoggerConfig::from_env(&env).min_level, Level::Info);
    }
}
