use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogRecord`], ordered from least to most severe.
///
/// `tracing` has no CRITICAL level; events reach it through a `severity`
/// field (see [`crate::layer::SEVERITY_FIELD`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Canonical upper-case name, e.g. `"WARNING"`.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::TRACE {
            Severity::Trace
        } else if level == tracing::Level::DEBUG {
            Severity::Debug
        } else if level == tracing::Level::INFO {
            Severity::Info
        } else if level == tracing::Level::WARN {
            Severity::Warning
        } else {
            Severity::Error
        }
    }
}

/// Error returned when a string names no known severity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Severity::Trace),
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            "CRITICAL" | "FATAL" => Ok(Severity::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = ParseSeverityError;

    fn try_from(value: String) -> Result<Self, ParseSeverityError> {
        value.parse()
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.name().to_string()
    }
}

/// One logging event as seen by the webhook handler.
///
/// `message` is already rendered: any template arguments were substituted
/// by the logging framework before the record was built.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub created: DateTime<Utc>,
    pub severity: Severity,
    pub target: String,
    pub message: String,
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl LogRecord {
    /// Build a record stamped with the current time and no extras.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            created: Utc::now(),
            severity,
            target: String::new(),
            message: message.into(),
            extras: BTreeMap::new(),
        }
    }

    /// Attach an extra attribute, replacing any previous value for `key`.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extras.get(key)
    }

    /// Creation time as fractional seconds since the Unix epoch.
    pub fn created_epoch_seconds(&self) -> f64 {
        self.created.timestamp_micros() as f64 / 1_000_000.0
    }
}
