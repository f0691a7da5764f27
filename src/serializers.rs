//! Serializer overrides applied to recognized keys, and the coercion rules
//! that turn call-site arguments into structured fields.
//!
//! Values logged under `error`/`err` through [`Fields::error`] are captured
//! from a genuine [`std::error::Error`]: message plus rendered source chain.
//! A plain JSON object that merely carries error-shaped keys gets no such
//! treatment and never grows a `stack` field. Values under `request`/`req`
//! and `response`/`res` are projected to a stable subset instead of being
//! dumped through generic object iteration.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;

/// Keys whose values are treated as captured errors.
pub const ERROR_KEYS: [&str; 2] = ["error", "err"];

/// Keys whose values are projected through the request transform.
pub const REQUEST_KEYS: [&str; 2] = ["request", "req"];

/// Keys whose values are projected through the response transform.
pub const RESPONSE_KEYS: [&str; 2] = ["response", "res"];

const REQUEST_FIELDS: [&str; 5] = ["method", "url", "headers", "remoteAddress", "remotePort"];
const RESPONSE_FIELDS: [&str; 2] = ["statusCode", "headers"];

/// Capture a genuine error value as `{ "message": .., "stack": .. }`.
///
/// The `stack` is the rendered source chain: the error's own text followed by
/// one `caused by:` line per source. Plain data that merely looks like an
/// error never passes through here, which is what keeps the
/// is-an-error/has-error-shaped-fields distinction observable in the output.
pub fn capture_error(err: &dyn Error) -> Value {
    let mut stack = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        stack.push_str("\ncaused by: ");
        stack.push_str(&cause.to_string());
        source = cause.source();
    }

    let mut captured = Map::new();
    captured.insert("message".to_string(), Value::String(err.to_string()));
    captured.insert("stack".to_string(), Value::String(stack));
    Value::Object(captured)
}

/// Project recognized request/response values to their stable subsets,
/// in place. Non-object values under those keys pass through unchanged.
pub fn apply_overrides(fields: &mut BTreeMap<String, Value>) {
    for key in REQUEST_KEYS {
        if let Some(value) = fields.get_mut(key) {
            project(value, &REQUEST_FIELDS);
        }
    }
    for key in RESPONSE_KEYS {
        if let Some(value) = fields.get_mut(key) {
            project(value, &RESPONSE_FIELDS);
        }
    }
}

fn project(value: &mut Value, keep: &[&str]) {
    if let Value::Object(map) = value {
        map.retain(|key, _| keep.contains(&key.as_str()));
    }
}

/// Structured fields for one log call.
///
/// The builder is the typed seam for error capture: only entries added via
/// [`Fields::error`] are serialized with a `stack`.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    entries: BTreeMap<String, Value>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one structured field. Values that fail to serialize are dropped
    /// rather than failing the log call.
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.entries.insert(key.into(), value);
        }
        self
    }

    /// Add a genuine error under `key`, captured via [`capture_error`].
    pub fn error(mut self, key: impl Into<String>, err: &dyn Error) -> Self {
        self.entries.insert(key.into(), capture_error(err));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.entries
    }
}

impl From<Value> for Fields {
    /// Best-effort coercion: an object becomes the field set; anything else
    /// becomes an empty one. String handling (string-as-message) lives in
    /// [`LogArgs`], which sees the message position too.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self {
                entries: map.into_iter().collect(),
            },
            _ => Self::default(),
        }
    }
}

/// Arguments accepted by every leveled log method: a bare message, a
/// structured payload, or both.
pub trait LogArgs {
    fn into_call(self) -> (Fields, Option<String>);
}

impl LogArgs for &str {
    fn into_call(self) -> (Fields, Option<String>) {
        (Fields::default(), Some(self.to_string()))
    }
}

impl LogArgs for String {
    fn into_call(self) -> (Fields, Option<String>) {
        (Fields::default(), Some(self))
    }
}

impl LogArgs for Value {
    /// A lone payload: objects carry fields and no message, a bare string is
    /// the message, anything else is an empty field set with no message.
    fn into_call(self) -> (Fields, Option<String>) {
        match self {
            Value::String(message) => (Fields::default(), Some(message)),
            other => (Fields::from(other), None),
        }
    }
}

impl LogArgs for (Value, &str) {
    fn into_call(self) -> (Fields, Option<String>) {
        let (payload, message) = self;
        (Fields::from(payload), Some(message.to_string()))
    }
}

impl LogArgs for (Fields, &str) {
    fn into_call(self) -> (Fields, Option<String>) {
        let (fields, message) = self;
        (fields, Some(message.to_string()))
    }
}

impl LogArgs for Fields {
    fn into_call(self) -> (Fields, Option<String>) {
        (self, None)
    }
}
