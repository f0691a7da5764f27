use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub level: Level,
    pub time: DateTime<Utc>,
    pub pid: u32,
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogRecord {
    /// Serialize to a single JSON line (no trailing newline).
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn serializes_flat_with_string_level_and_iso_time() {
        let mut fields = BTreeMap::new();
        fields.insert("requestId".to_string(), json!("abc-123"));

        let record = LogRecord {
            level: Level::Warn,
            time: Utc::now(),
            pid: 42,
            hostname: "unit-test-host".to_string(),
            message: Some("something odd".to_string()),
            fields,
        };

        let parsed: Value = serde_json::from_str(&record.to_line().unwrap()).unwrap();
        assert_eq!(parsed["level"], "warn");
        assert_eq!(parsed["message"], "something odd");
        assert_eq!(parsed["pid"], 42);
        assert_eq!(parsed["hostname"], "unit-test-host");
        assert_eq!(parsed["requestId"], "abc-123");
        // RFC 3339 wall-clock time, not an epoch counter.
        let time = parsed["time"].as_str().unwrap();
        assert!(time.contains('T'), "{time}");
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok(), "{time}");
    }

    #[test]
    fn missing_message_is_omitted_entirely() {
        let record = LogRecord {
            level: Level::Info,
            time: Utc::now(),
            pid: 1,
            hostname: "h".to_string(),
            message: None,
            fields: BTreeMap::new(),
        };

        let parsed: Value = serde_json::from_str(&record.to_line().unwrap()).unwrap();
        assert!(parsed.get("message").is_none());
    }
}
