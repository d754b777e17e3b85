//! HTTP client for the payment provider API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

mod doku;

pub use doku::DokuClient;

use reqwest::StatusCode;
use serde_json::Value;

/// Errors produced by the provider client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("provider error: status {status}, body: {raw}")]
    Upstream { status: StatusCode, raw: Value },

    /// The provider accepted the checkout but sent no payment URL.
    #[error("provider response has no payment url")]
    MissingPaymentUrl { raw: Value },

    /// Request body could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    /// The provider's response body, when the failure came from the provider.
    pub fn upstream_payload(&self) -> Option<&Value> {
        match self {
            Self::Upstream { raw, .. } | Self::MissingPaymentUrl { raw } => Some(raw),
            _ => None,
        }
    }
}
