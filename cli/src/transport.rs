//! Blocking [`Transport`] backed by ureq.
//!
//! ureq's status-code-as-error behaviour is disabled so 4xx/5xx responses
//! come back as data and the executor does all status interpretation.
//! Only failures that happen before a status line arrives are errors.

use std::time::Duration;

use invite_core::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
use tracing::{trace, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds each attempt end to end; hitting it is a network
    /// failure, so the executor backs off and retries.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "sending request");
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(classify)?;
        let status = response.status().as_u16();
        // The status line arrived, so this is a response whatever happens to
        // the body; re-sending could duplicate the invitation.
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %request.url, status, error = %e, "failed to read response body");
                String::new()
            }
        };
        Ok(HttpResponse { status, body })
    }
}

/// Anything that can clear up on its own (proxy hiccups and TLS handshake
/// failures included) is a network failure; the rest is a bad request.
fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Io(_)
        | ureq::Error::Timeout(_)
        | ureq::Error::HostNotFound
        | ureq::Error::ConnectionFailed
        | ureq::Error::ConnectProxyFailed(_)
        | ureq::Error::BodyStalled
        | ureq::Error::Tls(_)
        | ureq::Error::Protocol(_) => TransportError::Network(err.to_string()),
        other => TransportError::Invalid(other.to_string()),
    }
}
