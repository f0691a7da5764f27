use crate::init::LoggerConfig;
use crate::level::Level;
use crate::record::LogRecord;
use crate::serializers::{self, LogArgs, ERROR_KEYS};
use crate::stream::LogStream;
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A ready-to-use leveled logger with permanently bound static metadata.
///
/// Each call synchronously builds one record and hands exactly one line to
/// the destination stream; record order in the output is call order. The
/// mutex only guards the stream handle, there is no queueing behind it.
pub struct Logger {
    min_level: Level,
    metadata: BTreeMap<String, Value>,
    hostname: String,
    pid: u32,
    stream: Mutex<Box<dyn LogStream>>,
}

impl Logger {
    pub(crate) fn new(
        config: LoggerConfig,
        metadata: BTreeMap<String, Value>,
        stream: Box<dyn LogStream>,
    ) -> Self {
        Self {
            min_level: config.min_level,
            metadata,
            hostname: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            stream: Mutex::new(stream),
        }
    }

    /// Minimum level this logger emits at.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn trace<A: LogArgs>(&self, args: A) {
        self.log(Level::Trace, args);
    }

    pub fn debug<A: LogArgs>(&self, args: A) {
        self.log(Level::Debug, args);
    }

    pub fn info<A: LogArgs>(&self, args: A) {
        self.log(Level::Info, args);
    }

    pub fn warn<A: LogArgs>(&self, args: A) {
        self.log(Level::Warn, args);
    }

    pub fn error<A: LogArgs>(&self, args: A) {
        self.log(Level::Error, args);
    }

    pub fn fatal<A: LogArgs>(&self, args: A) {
        self.log(Level::Fatal, args);
    }

    /// Emit one record at `level`, if it clears the minimum.
    ///
    /// Call-site fields are merged first, then the bound static metadata, so
    /// identity keys always win a collision. Failures to serialize or write
    /// are reported to stderr and swallowed; a log call never panics.
    pub fn log<A: LogArgs>(&self, level: Level, args: A) {
        if level == Level::Silent || level < self.min_level {
            return;
        }

        let (fields, message) = args.into_call();
        let mut fields = fields.into_map();
        serializers::apply_overrides(&mut fields);

        let message = message.or_else(|| captured_error_message(&fields));
        if let Some(explicit) = &message {
            override_captured_messages(&mut fields, explicit);
        }

        for (key, value) in &self.metadata {
            fields.insert(key.clone(), value.clone());
        }

        let record = LogRecord {
            level,
            time: Utc::now(),
            pid: self.pid,
            hostname: self.hostname.clone(),
            message,
            fields,
        };

        match record.to_line() {
            Ok(line) => {
                let mut stream = self
                    .stream
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err(e) = stream.write_line(&line) {
                    eprintln!("log write failed: {e}");
                }
            }
            Err(e) => eprintln!("log record serialization failed: {e}"),
        }
    }
}

/// A captured error carries both `message` and `stack`; anything without a
/// `stack` is plain data and is left alone.
fn is_captured_error(value: &Value) -> bool {
    value.get("stack").is_some_and(Value::is_string)
}

fn captured_error_message(fields: &BTreeMap<String, Value>) -> Option<String> {
    ERROR_KEYS.iter().find_map(|key| {
        fields
            .get(*key)
            .filter(|value| is_captured_error(value))
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    })
}

fn override_captured_messages(fields: &mut BTreeMap<String, Value>, message: &str) {
    for key in ERROR_KEYS {
        if let Some(value) = fields.get_mut(key) {
            if is_captured_error(value) {
                if let Some(object) = value.as_object_mut() {
                    object.insert("message".to_string(), Value::String(message.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureStream;
    use crate::serializers::Fields;
    use serde_json::json;
    use std::io;

    fn logger_at(min_level: Level) -> (Logger, CaptureStream) {
        let capture = CaptureStream::new();
        let logger = Logger::new(
            LoggerConfig { min_level },
            BTreeMap::new(),
            Box::new(capture.clone()),
        );
        (logger, capture)
    }

    fn single_record(capture: &CaptureStream) -> Value {
        let lines = capture.lines();
        assert_eq!(lines.len(), 1, "expected exactly one record: {lines:?}");
        serde_json::from_str(&lines[0]).unwrap()
    }

    #[test]
    fn below_minimum_level_writes_nothing() {
        let (logger, capture) = logger_at(Level::Warn);
        logger.trace("quiet");
        logger.debug("quiet");
        logger.info("quiet");
        assert!(capture.lines().is_empty());

        logger.warn("loud");
        assert_eq!(capture.lines().len(), 1);
    }

    #[test]
    fn silent_minimum_suppresses_everything() {
        let (logger, capture) = logger_at(Level::Silent);
        for level in Level::EMITTABLE {
            logger.log(level, "nope");
        }
        assert!(capture.lines().is_empty());
    }

    #[test]
    fn every_level_emits_its_lowercase_label() {
        let (logger, capture) = logger_at(Level::Trace);
        for level in Level::EMITTABLE {
            logger.log(level, "labelled");
        }
        let lines = capture.lines();
        let labels: Vec<String> = lines
            .iter()
            .map(|line| {
                let parsed: Value = serde_json::from_str(line).unwrap();
                parsed["level"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(labels, ["trace", "debug", "info", "warn", "error", "fatal"]);
    }

    #[test]
    fn bound_metadata_wins_key_collisions() {
        let capture = CaptureStream::new();
        let mut metadata = BTreeMap::new();
        metadata.insert("systemCode".to_string(), json!("bound-system"));
        let logger = Logger::new(
            LoggerConfig {
                min_level: Level::Info,
            },
            metadata,
            Box::new(capture.clone()),
        );

        logger.info((json!({"systemCode": "call-site", "other": 1}), "collide"));
        let record = single_record(&capture);
        assert_eq!(record["systemCode"], "bound-system");
        assert_eq!(record["other"], 1);
    }

    #[test]
    fn explicit_message_overrides_captured_error_message() {
        let (logger, capture) = logger_at(Level::Info);
        let err = io::Error::new(io::ErrorKind::Other, "disk on fire");
        logger.error((Fields::new().error("error", &err), "saved you the details"));

        let record = single_record(&capture);
        assert_eq!(record["message"], "saved you the details");
        assert_eq!(record["error"]["message"], "saved you the details");
        assert!(record["error"]["stack"].as_str().unwrap().contains("disk on fire"));
    }

    #[test]
    fn captured_error_supplies_missing_message() {
        let (logger, capture) = logger_at(Level::Info);
        let err = io::Error::new(io::ErrorKind::Other, "disk on fire");
        logger.error(Fields::new().error("err", &err));

        let record = single_record(&capture);
        assert_eq!(record["message"], "disk on fire");
        assert_eq!(record["err"]["message"], "disk on fire");
    }

    #[test]
    fn error_shaped_plain_object_is_not_promoted() {
        let (logger, capture) = logger_at(Level::Info);
        logger.error((json!({"error": {"message": "fake", "code": 1}}), "real message"));

        let record = single_record(&capture);
        // no stack synthesized, and the plain object's message is untouched
        assert!(record["error"].get("stack").is_none());
        assert_eq!(record["error"]["message"], "fake");
        assert_eq!(record["message"], "real message");
    }

    #[test]
    fn non_object_payload_still_emits() {
        let (logger, capture) = logger_at(Level::Info);
        logger.info(json!(3.5));
        let record = single_record(&capture);
        assert_eq!(record["level"], "info");
        assert!(record.get("message").is_none());
    }
}
