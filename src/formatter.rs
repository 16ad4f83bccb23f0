use crate::record::{LogRecord, Severity};
use serde::Serialize;
use serde_json::{json, Value};

/// Body handed to the transport.
///
/// Formatters either pre-encode the JSON themselves or return a value for
/// the transport to encode.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON text, sent verbatim.
    Encoded(String),
    /// Structured value, JSON-encoded by the transport.
    Structured(Value),
}

impl Payload {
    /// The JSON text that goes on the wire.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        match self {
            Payload::Encoded(s) => Ok(s.clone()),
            Payload::Structured(v) => serde_json::to_string(v),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("payload is not JSON-encodable: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders a record into a [`Payload`].
pub trait PayloadFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> Result<Payload, FormatError>;
}

/// Plain-text payload: `{"text": "<message>"}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFormatter;

impl PayloadFormatter for SimpleFormatter {
    fn format(&self, record: &LogRecord) -> Result<Payload, FormatError> {
        Ok(Payload::Structured(json!({ "text": record.message })))
    }
}

/// Attachment payload with timestamp, optional title and a severity colour.
///
/// ```text
/// {"attachments":[{"ts":1700000000.25,"text":"...","title":null,"color":"good"}]}
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyledFormatter {
    title: Option<String>,
}

impl StyledFormatter {
    pub fn new(title: Option<String>) -> Self {
        Self { title }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self::new(Some(title.into()))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

#[derive(Serialize)]
struct Attachments<'a> {
    attachments: [Attachment<'a>; 1],
}

#[derive(Serialize)]
struct Attachment<'a> {
    ts: f64,
    text: &'a str,
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'static str>,
}

impl PayloadFormatter for StyledFormatter {
    fn format(&self, record: &LogRecord) -> Result<Payload, FormatError> {
        let body = Attachments {
            attachments: [Attachment {
                ts: record.created_epoch_seconds(),
                text: &record.message,
                title: self.title(),
                color: colour_for(record.severity),
            }],
        };
        Ok(Payload::Encoded(serde_json::to_string(&body)?))
    }
}

/// Attachment border colour for `severity`, if it has one.
pub fn colour_for(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Info => Some("good"),
        Severity::Warning => Some("warning"),
        Severity::Error => Some("#E91E63"),
        Severity::Critical => Some("danger"),
        Severity::Trace | Severity::Debug => None,
    }
}
