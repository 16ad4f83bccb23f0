use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

use webhook_logger::{LoggingConfig, WebhookLayer};

const CONFIG: &str = r#"{
    "filters": { "notify_slack": { "kind": "notify" } },
    "formatters": { "slack_format": { "kind": "styled", "title": "Ops" } },
    "handlers": {
        "slack": {
            "level": "INFO",
            "filters": ["notify_slack"],
            "formatter": "slack_format"
        }
    }
}"#;

/// Builds the handler from a JSON document. The handler has no `hook_url`,
/// so the URL comes from `SLACK_WEBHOOK_URL`.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut handlers = LoggingConfig::from_json_str(CONFIG)?.build()?;
    let Some(slack) = handlers.remove("slack") else {
        return Err("config has no `slack` handler".into());
    };

    let subscriber = tracing_subscriber::registry()
        .with(WebhookLayer::new(slack))
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    info!("console only");
    info!(notify_slack = true, "nightly backup completed");
    Ok(())
}
