use crate::env::{EnvDefaultUrl, SLACK_WEBHOOK_URL_ENV};
use crate::filter::{NotifyFilter, RecordFilter};
use crate::formatter::{SimpleFormatter, StyledFormatter};
use crate::handler::WebhookHandler;
use crate::record::Severity;
use crate::transport::WebhookTransport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Declarative description of webhook handlers.
///
/// A [`LoggingConfig`] names filters and formatters once and lets handlers
/// refer to them by name:
///
/// ```json
/// {
///   "filters":    { "notify_slack": { "kind": "notify" } },
///   "formatters": { "slack_format": { "kind": "styled", "title": "Alerts" } },
///   "handlers": {
///     "slack": {
///       "level": "INFO",
///       "filters": ["notify_slack"],
///       "hook_url": "https://hooks.slack.com/services/T/B/X",
///       "formatter": "slack_format"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub filters: BTreeMap<String, FilterConfig>,
    pub formatters: BTreeMap<String, FormatterConfig>,
    pub handlers: BTreeMap<String, HandlerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterConfig {
    /// [`NotifyFilter`]; `key` defaults to `notify_slack`.
    Notify {
        #[serde(default)]
        key: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormatterConfig {
    Styled {
        #[serde(default)]
        title: Option<String>,
    },
    Simple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlerConfig {
    pub hook_url: Option<String>,
    pub level: Option<Severity>,
    /// Name of an entry in [`LoggingConfig::formatters`].
    pub formatter: Option<String>,
    /// Names of entries in [`LoggingConfig::filters`].
    pub filters: Vec<String>,
    /// Variable holding the fallback URL when `hook_url` is absent.
    /// Defaults to `SLACK_WEBHOOK_URL`.
    pub default_url_env: Option<String>,
}

/// Error type returned when parsing or building a [`LoggingConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid logging configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("handler {handler:?} references unknown filter {name:?}")]
    UnknownFilter { handler: String, name: String },

    #[error("handler {handler:?} references unknown formatter {name:?}")]
    UnknownFormatter { handler: String, name: String },
}

impl FilterConfig {
    pub fn build(&self) -> Arc<dyn RecordFilter> {
        match self {
            FilterConfig::Notify { key: Some(key) } => Arc::new(NotifyFilter::with_key(key.clone())),
            FilterConfig::Notify { key: None } => Arc::new(NotifyFilter::new()),
        }
    }
}

impl LoggingConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Build every handler, delivering through the default HTTP transport.
    #[cfg(feature = "http")]
    pub fn build(&self) -> Result<BTreeMap<String, WebhookHandler>, ConfigError> {
        self.build_with_transport(Arc::new(crate::transport::ReqwestTransport::new()))
    }

    /// Build every handler, all sharing `transport`.
    ///
    /// Filters are built once and shared between the handlers that name
    /// them.
    pub fn build_with_transport(
        &self,
        transport: Arc<dyn WebhookTransport>,
    ) -> Result<BTreeMap<String, WebhookHandler>, ConfigError> {
        let filters: BTreeMap<&str, Arc<dyn RecordFilter>> = self
            .filters
            .iter()
            .map(|(name, cfg)| (name.as_str(), cfg.build()))
            .collect();

        self.handlers
            .iter()
            .map(|(name, cfg)| {
                let handler = self.build_handler(name, cfg, &filters, Arc::clone(&transport))?;
                Ok::<_, ConfigError>((name.clone(), handler))
            })
            .collect()
    }

    fn build_handler(
        &self,
        name: &str,
        cfg: &HandlerConfig,
        filters: &BTreeMap<&str, Arc<dyn RecordFilter>>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Result<WebhookHandler, ConfigError> {
        let mut handler = WebhookHandler::with_transport(cfg.hook_url.clone(), transport);

        if cfg.hook_url.is_none() {
            let var = cfg.default_url_env.as_deref().unwrap_or(SLACK_WEBHOOK_URL_ENV);
            handler = handler.with_default_url(EnvDefaultUrl::from_var(var));
        }

        if let Some(level) = cfg.level {
            handler = handler.with_level(level);
        }

        if let Some(formatter) = &cfg.formatter {
            handler = match self.formatters.get(formatter) {
                Some(FormatterConfig::Styled { title }) => {
                    handler.with_formatter(StyledFormatter::new(title.clone()))
                }
                Some(FormatterConfig::Simple) => handler.with_formatter(SimpleFormatter),
                None => {
                    return Err(ConfigError::UnknownFormatter {
                        handler: name.to_string(),
                        name: formatter.clone(),
                    })
                }
            };
        }

        for filter in &cfg.filters {
            let Some(built) = filters.get(filter.as_str()) else {
                return Err(ConfigError::UnknownFilter {
                    handler: name.to_string(),
                    name: filter.clone(),
                });
            };
            handler = handler.with_shared_filter(Arc::clone(built));
        }

        Ok(handler)
    }
}
