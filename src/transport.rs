use crate::formatter::Payload;
#[cfg(feature = "http")]
use std::time::Duration;

/// HTTP capability used by [`crate::handler::WebhookHandler`] to deliver a
/// payload.
///
/// Implementations perform exactly one synchronous POST and return the
/// response status. Any completed exchange is `Ok`, whatever the status;
/// only transport-level problems (connection refused, DNS, TLS, timeout)
/// are `Err`.
pub trait WebhookTransport: Send + Sync {
    fn post(&self, url: &str, payload: &Payload) -> Result<u16, TransportError>;
}

/// Error type returned by [`WebhookTransport::post`].
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[cfg(feature = "http")]
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("payload could not be encoded: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("webhook request thread panicked")]
    WorkerPanicked,

    #[error("{0}")]
    Other(String),
}

/// Blocking [`reqwest`] transport.
///
/// Every call builds a fresh client, so there is no connection reuse
/// between records. Without an explicit timeout the client default
/// applies.
#[cfg(feature = "http")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    timeout: Option<Duration>,
}

#[cfg(feature = "http")]
impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the whole-request timeout of the underlying client.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout: Some(timeout) }
    }

    fn send(&self, url: &str, payload: &Payload) -> Result<u16, TransportError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let request = match payload {
            Payload::Encoded(body) => client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone()),
            Payload::Structured(value) => client.post(url).json(value),
        };
        let resp = request.send()?;
        Ok(resp.status().as_u16())
    }
}

#[cfg(feature = "http")]
impl WebhookTransport for ReqwestTransport {
    fn post(&self, url: &str, payload: &Payload) -> Result<u16, TransportError> {
        // reqwest's blocking client panics when driven from a Tokio runtime
        // thread, so hop to a plain thread and wait for it.
        if tokio::runtime::Handle::try_current().is_ok() {
            std::thread::scope(|s| {
                s.spawn(|| self.send(url, payload))
                    .join()
                    .unwrap_or(Err(TransportError::WorkerPanicked))
            })
        } else {
            self.send(url, payload)
        }
    }
}
