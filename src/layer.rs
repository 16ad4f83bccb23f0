use crate::handler::WebhookHandler;
use crate::record::{LogRecord, Severity};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Event field that overrides the level-derived [`Severity`], e.g.
/// `error!(severity = "CRITICAL", "disk full")`.
pub const SEVERITY_FIELD: &str = "severity";

/// `tracing_subscriber` layer that turns events into [`LogRecord`]s and
/// hands them to a [`WebhookHandler`] on the logging thread.
///
/// Events emitted by this crate itself are skipped.
#[derive(Clone, Debug)]
pub struct WebhookLayer {
    handler: Arc<WebhookHandler>,
}

impl WebhookLayer {
    pub fn new(handler: WebhookHandler) -> Self {
        Self::from_shared(Arc::new(handler))
    }

    pub fn from_shared(handler: Arc<WebhookHandler>) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &WebhookHandler {
        &self.handler
    }
}

impl<S> Layer<S> for WebhookLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_own_target(meta.target()) || is_http_stack_target(meta.target()) {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let severity = fields
            .get(SEVERITY_FIELD)
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse::<Severity>().ok())
            .unwrap_or_else(|| Severity::from(*meta.level()));

        let record = LogRecord {
            created: Utc::now(),
            severity,
            target: meta.target().to_string(),
            message: message.unwrap_or_default(),
            extras: fields,
        };

        self.handler.handle(&record);
    }
}

fn is_own_target(target: &str) -> bool {
    let own = env!("CARGO_CRATE_NAME");
    target == own || target.strip_prefix(own).is_some_and(|rest| rest.starts_with("::"))
}

/// Crates that run underneath [`crate::transport::ReqwestTransport`]. Their
/// events fire while a post is in flight, often on the client's own worker
/// threads, and would otherwise trigger further posts.
const HTTP_STACK_TARGETS: &[&str] = &[
    "hyper", "hyper_util", "reqwest", "h2", "rustls", "want", "tokio", "mio",
];

fn is_http_stack_target(target: &str) -> bool {
    HTTP_STACK_TARGETS.iter().any(|krate| {
        target == *krate || target.strip_prefix(krate).is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Collects event fields: the `message` field becomes the rendered text,
/// everything else lands in the extras as JSON values.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `format_args!` messages arrive here; Debug of Arguments is the
        // rendered text.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
