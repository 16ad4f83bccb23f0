use crate::handler::WebhookHandler;
use crate::layer::WebhookLayer;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Options for [`init_tracing_with_config`].
///
/// **Fields**
/// - `enable_stdout`: when `true`, a `tracing_subscriber::fmt` layer is
///   stacked on top of the [`WebhookLayer`] so events are also printed to
///   the console.
#[derive(Clone, Debug)]
pub struct InitConfig {
    pub enable_stdout: bool,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// Install a global `tracing` subscriber that forwards events to `handler`.
///
/// **Parameters**
/// - `handler`: configured [`WebhookHandler`]; its filters and level decide
///   which events become webhook posts.
/// - `config`: [`InitConfig`] controlling console output.
///
/// **Errors**
///
/// Returns [`SetGlobalDefaultError`] if a global subscriber was already
/// installed.
pub fn init_tracing_with_config(
    handler: WebhookHandler,
    config: InitConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = WebhookLayer::new(handler);

    // The two stacks have different types, so each branch installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`InitConfig::default`].
pub fn init_tracing(handler: WebhookHandler) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(handler, InitConfig::default())
}
