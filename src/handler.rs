use crate::env::DefaultUrl;
use crate::filter::RecordFilter;
use crate::formatter::{FormatError, PayloadFormatter, StyledFormatter};
use crate::record::{LogRecord, Severity};
use crate::transport::{TransportError, WebhookTransport};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Failure raised while emitting one record.
#[derive(thiserror::Error, Debug)]
pub enum EmitError {
    #[error("formatting failed: {0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Receives emit failures. Must not panic.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, record: &LogRecord, error: &EmitError);
}

/// Prints emit failures to stderr.
///
/// Failures are not routed through `tracing` so that a broken webhook can
/// never feed its own errors back into the pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrReporter;

impl ErrorReporter for StderrReporter {
    fn report(&self, record: &LogRecord, error: &EmitError) {
        eprintln!(
            "--- webhook logging error ---\n{error}\nrecord: {} {:?}",
            record.severity, record.message
        );
    }
}

/// Terminal state of one [`WebhookHandler::handle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No URL configured, level too low, or a filter said no.
    Rejected,
    /// The POST completed, whatever the HTTP status.
    Delivered,
    /// Formatting or transport failed and the reporter was told.
    ErrorReported,
}

enum UrlSource {
    Explicit,
    Provider(Arc<dyn DefaultUrl>),
    Unset,
}

/// Posts accepted records to a chat webhook.
///
/// ```no_run
/// use webhook_logger::{LogRecord, NotifyFilter, Severity, StyledFormatter, WebhookHandler};
///
/// let handler = WebhookHandler::new(Some("https://hooks.slack.com/services/T/B/X".into()))
///     .with_formatter(StyledFormatter::with_title("Alerts"))
///     .with_filter(NotifyFilter::new());
/// handler.handle(&LogRecord::new(Severity::Info, "deploy finished").with_extra("notify_slack", true));
/// ```
pub struct WebhookHandler {
    source: UrlSource,
    url: OnceLock<String>,
    formatter: Box<dyn PayloadFormatter>,
    filters: Vec<Arc<dyn RecordFilter>>,
    level: Severity,
    transport: Arc<dyn WebhookTransport>,
    reporter: Arc<dyn ErrorReporter>,
}

impl WebhookHandler {
    /// Build a handler delivering through [`crate::transport::ReqwestTransport`].
    ///
    /// The environment is not consulted: without an explicit URL the handler
    /// stays disabled unless a default is supplied with
    /// [`WebhookHandler::with_default_url`]. Use [`WebhookHandler::from_env`]
    /// for the `SLACK_WEBHOOK_URL` fallback that config-built handlers get.
    #[cfg(feature = "http")]
    pub fn new(url: Option<String>) -> Self {
        Self::with_transport(url, Arc::new(crate::transport::ReqwestTransport::new()))
    }

    /// Handler whose URL comes from `SLACK_WEBHOOK_URL`, read on first use.
    #[cfg(feature = "http")]
    pub fn from_env() -> Self {
        Self::new(None).with_default_url(crate::env::EnvDefaultUrl::new())
    }

    pub fn with_transport(url: Option<String>, transport: Arc<dyn WebhookTransport>) -> Self {
        let cache = OnceLock::new();
        let source = match url {
            Some(url) => {
                let _ = cache.set(url);
                UrlSource::Explicit
            }
            None => UrlSource::Unset,
        };
        Self {
            source,
            url: cache,
            formatter: Box::new(StyledFormatter::default()),
            filters: Vec::new(),
            level: Severity::Trace,
            transport,
            reporter: Arc::new(StderrReporter),
        }
    }

    /// Fallback consulted once if no explicit URL was given.
    pub fn with_default_url(mut self, provider: impl DefaultUrl + 'static) -> Self {
        if !matches!(self.source, UrlSource::Explicit) {
            self.source = UrlSource::Provider(Arc::new(provider));
        }
        self
    }

    pub fn with_formatter(mut self, formatter: impl PayloadFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_filter(self, filter: impl RecordFilter + 'static) -> Self {
        self.with_shared_filter(Arc::new(filter))
    }

    /// Attach a filter that may also be attached to other handlers.
    pub fn with_shared_filter(mut self, filter: Arc<dyn RecordFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Minimum severity accepted by this handler.
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn level(&self) -> Severity {
        self.level
    }

    /// Destination URL; empty when none could be resolved.
    ///
    /// The default provider is read on first call only and its answer is
    /// kept for the lifetime of the handler.
    pub fn hook_url(&self) -> &str {
        self.url.get_or_init(|| match &self.source {
            UrlSource::Provider(provider) => provider.default_url().unwrap_or_default(),
            UrlSource::Explicit | UrlSource::Unset => String::new(),
        })
    }

    /// Whether `record` should be emitted.
    ///
    /// Always `false` without a URL, which turns the handler off in
    /// environments that have no webhook configured.
    pub fn should_accept(&self, record: &LogRecord) -> bool {
        if self.hook_url().is_empty() {
            return false;
        }
        if record.severity < self.level {
            return false;
        }
        self.filters.iter().all(|f| f.accept(record))
    }

    /// Format `record` and POST it once. Failures go to the reporter.
    ///
    /// Nothing is sent while the URL is empty.
    pub fn emit(&self, record: &LogRecord) -> Outcome {
        if self.hook_url().is_empty() {
            return Outcome::Rejected;
        }
        match self.deliver(record) {
            Ok(status) => {
                if (200..300).contains(&status) {
                    debug!(status, "webhook notification delivered");
                } else {
                    // Non-2xx answers are not retried or escalated.
                    debug!(status, "webhook rejected notification, ignoring");
                }
                Outcome::Delivered
            }
            Err(err) => {
                self.reporter.report(record, &err);
                Outcome::ErrorReported
            }
        }
    }

    /// Run the accept chain and emit if it passes.
    pub fn handle(&self, record: &LogRecord) -> Outcome {
        if !self.should_accept(record) {
            trace!(severity = %record.severity, "record not forwarded to webhook");
            return Outcome::Rejected;
        }
        self.emit(record)
    }

    fn deliver(&self, record: &LogRecord) -> Result<u16, EmitError> {
        let payload = self.formatter.format(record)?;
        Ok(self.transport.post(self.hook_url(), &payload)?)
    }
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("url", &self.url.get())
            .field("level", &self.level)
            .field("filters", &self.filters.len())
            .finish()
    }
}
