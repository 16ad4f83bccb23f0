pub mod record;
pub mod filter;
pub mod formatter;
pub mod transport;
pub mod handler;
pub mod layer;

pub mod config;
pub mod env;
pub mod init;

pub use config::{ConfigError, LoggingConfig};
pub use env::{DefaultUrl, EnvDefaultUrl, SLACK_WEBHOOK_URL_ENV};
pub use filter::{NotifyFilter, RecordFilter, NOTIFY_FIELD};
pub use formatter::{Payload, PayloadFormatter, SimpleFormatter, StyledFormatter};
pub use handler::{EmitError, ErrorReporter, Outcome, StderrReporter, WebhookHandler};
pub use init::{init_tracing, init_tracing_with_config, InitConfig};
pub use layer::WebhookLayer;
pub use record::{LogRecord, Severity};
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{TransportError, WebhookTransport};
