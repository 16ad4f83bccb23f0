/// Environment variable consulted for a default webhook URL when a handler
/// is built without an explicit one.
pub const SLACK_WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";

/// Source of a fallback webhook URL.
///
/// A [`crate::handler::WebhookHandler`] asks its provider at most once and
/// caches the answer, including `None`.
pub trait DefaultUrl: Send + Sync {
    fn default_url(&self) -> Option<String>;
}

impl<F> DefaultUrl for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn default_url(&self) -> Option<String> {
        self()
    }
}

/// Reads the default URL from an environment variable.
#[derive(Clone, Debug)]
pub struct EnvDefaultUrl {
    key: String,
}

impl EnvDefaultUrl {
    /// Read [`SLACK_WEBHOOK_URL_ENV`].
    pub fn new() -> Self {
        Self::from_var(SLACK_WEBHOOK_URL_ENV)
    }

    pub fn from_var(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for EnvDefaultUrl {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultUrl for EnvDefaultUrl {
    fn default_url(&self) -> Option<String> {
        std::env::var(&self.key).ok()
    }
}

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
