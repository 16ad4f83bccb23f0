use crate::record::LogRecord;
use serde_json::Value;

/// Extra attribute that opts a record into webhook delivery.
///
/// ```ignore
/// tracing::info!(notify_slack = true, "deploy finished");
/// ```
pub const NOTIFY_FIELD: &str = "notify_slack";

/// Predicate attached to a [`crate::handler::WebhookHandler`].
///
/// Filters are `Send + Sync` and must not hold mutable state; the handler
/// calls them from whatever thread the event was logged on.
pub trait RecordFilter: Send + Sync {
    /// Return `true` if `record` should be forwarded.
    fn accept(&self, record: &LogRecord) -> bool;
}

impl<F> RecordFilter for F
where
    F: Fn(&LogRecord) -> bool + Send + Sync,
{
    fn accept(&self, record: &LogRecord) -> bool {
        self(record)
    }
}

/// Accepts records whose extras carry a truthy notification flag.
///
/// A missing flag is treated as `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyFilter {
    key: String,
}

impl NotifyFilter {
    pub fn new() -> Self {
        Self::with_key(NOTIFY_FIELD)
    }

    /// Use `key` instead of [`NOTIFY_FIELD`] as the flag name.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for NotifyFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordFilter for NotifyFilter {
    fn accept(&self, record: &LogRecord) -> bool {
        record.extra(&self.key).is_some_and(is_truthy)
    }
}

/// Truthiness of an extra attribute value.
///
/// `null`, `false`, zero, and empty strings, arrays or objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
