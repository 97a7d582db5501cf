use thiserror::Error;
use ureq::Agent;

use crate::config::UpdateHost;

/// Path of the update endpoint on the configured host.
pub const UPDATE_PATH: &str = "/update";

/// Status and fully read body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// DNS, connect, TLS or timeout failure before a status was received.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: ureq::Error,
    },
}

/// Sends a JSON body to a path on the update server.
///
/// Implementations must return non-2xx statuses as an [`HttpReply`], keeping
/// [`TransportError`] for failures where no response arrived.
pub trait Transport {
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the request could not be completed.
    fn post_json(&self, path: &str, body: &str) -> Result<HttpReply, TransportError>;
}

/// HTTPS transport backed by a blocking `ureq` agent.
///
/// Uses the platform's standard certificate validation and the client's
/// default timeouts. Nothing is retried.
pub struct HttpsTransport {
    agent: Agent,
    base_url: String,
}

impl HttpsTransport {
    #[must_use]
    pub fn new(host: &UpdateHost) -> Self {
        Self::with_base_url(base_url(host))
    }

    /// Point the transport at an explicit `scheme://host[:port]` origin.
    pub(crate) fn with_base_url(base_url: String) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent, base_url }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn base_url(host: &UpdateHost) -> String {
    format!("https://{host}")
}

impl Transport for HttpsTransport {
    fn post_json(&self, path: &str, body: &str) -> Result<HttpReply, TransportError> {
        let url = self.url(path);
        tracing::debug!("POST {url} ({} bytes)", body.len());

        // ureq sets Content-Length from the sized body
        let mut response = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|source| TransportError::Body {
                url: url.clone(),
                source,
            })?;

        tracing::debug!("{url} -> HTTP {status}");
        Ok(HttpReply { status, body })
    }
}
