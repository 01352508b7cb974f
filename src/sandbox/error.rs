//! Failure taxonomy for sandbox deployments.

use thiserror::Error;

/// Maximum number of characters of a rejected response body kept in the
/// error message.
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Why a deployment did not produce a sandbox.
///
/// Every variant is an expected outcome of talking to the provider and is
/// surfaced to callers inside [`super::DeploymentResult::Failure`], never as
/// an `Err` escaping [`super::SandboxDeployer::deploy`].
#[derive(Debug, Error)]
pub enum DeployError {
    /// The provider answered with a non-2xx status.
    #[error("API Error {status}: {body}")]
    ProviderRejected { status: u16, body: String },

    /// 2xx response whose body is not JSON.
    #[error("Invalid JSON response from API")]
    MalformedResponse,

    /// JSON response without a usable `sandbox_id`.
    #[error("No sandbox_id in response")]
    IncompleteResponse,

    /// DNS, connect, TLS, timeout or body-read failure.
    #[error("Request error: {}", error_chain(.0))]
    Transport(#[source] reqwest::Error),

    /// Anything else that went wrong along the way.
    #[error("{0}")]
    Unexpected(String),
}

impl DeployError {
    /// Build a [`DeployError::ProviderRejected`], keeping only the head of the body.
    pub fn rejected(status: u16, body: &str) -> Self {
        Self::ProviderRejected {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// True when the request ran past the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

impl From<reqwest::Error> for DeployError {
    fn from(e: reqwest::Error) -> Self {
        // Builder errors (bad header value, bad URL) never reached the network.
        if e.is_builder() {
            Self::Unexpected(error_chain(&e))
        } else {
            Self::Transport(e)
        }
    }
}

/// Render an error followed by its `source()` chain, `outer: inner: root`.
///
/// reqwest keeps the interesting part ("operation timed out", "connection
/// refused") in the source chain, not in the top-level message.
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = inner.source();
    }
    out
}
