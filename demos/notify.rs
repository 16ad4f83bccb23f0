use tracing::{error, info, warn};

use webhook_logger::env::env_or;
use webhook_logger::{init_tracing, NotifyFilter, Severity, StyledFormatter, WebhookHandler};

/// Posts two of the three events below to the webhook named by
/// `SLACK_WEBHOOK_URL`. Without it the handler stays silent and the events
/// only reach the console.
fn main() {
    let title = env_or("WEBHOOK_DEMO_TITLE", "Deployments");

    let handler = WebhookHandler::from_env()
        .with_formatter(StyledFormatter::with_title(title))
        .with_filter(NotifyFilter::new())
        .with_level(Severity::Info);

    if let Err(e) = init_tracing(handler) {
        eprintln!("tracing already initialised: {e}");
        return;
    }

    info!(notify_slack = true, version = "1.4.2", "Deploy {} finished", "1.4.2");
    warn!("cache warmup slow, not worth a ping");
    error!(notify_slack = true, severity = "CRITICAL", "primary database unreachable");
}
