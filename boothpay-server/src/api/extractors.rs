//! Custom Axum extractors.
//!
//! Provides `RawNotification`, which captures a provider notification
//! exactly as it arrived: the signature headers and the unparsed body bytes.
//! Signatures are computed over those bytes, so the body must never be
//! deserialized and re-encoded before verification.

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use boothpay_core::processors::InboundNotification;
use boothpay_sdk::objects::CallbackHeaders;
use boothpay_sdk::signature::{
    CLIENT_ID_HEADER, REQUEST_ID_HEADER, REQUEST_TIMESTAMP_HEADER, SIGNATURE_HEADER,
};
use serde_json::json;

/// Largest notification body accepted.
const MAX_NOTIFICATION_BODY: usize = 1024 * 1024;

/// A provider notification with its raw body.
pub struct RawNotification(pub InboundNotification);

/// Errors returned by the [`RawNotification`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum RawNotificationError {
    #[error("failed to read request body")]
    BodyReadError,
}

impl IntoResponse for RawNotificationError {
    /// The provider retries on any non-200 answer, so even an unreadable
    /// notification is acknowledged with 200 and `ok: false`.
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(json!({ "ok": false, "reason": self.to_string() })),
        )
            .into_response()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

impl<S: Send + Sync> FromRequest<S> for RawNotification {
    type Rejection = RawNotificationError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = req.headers();
        let callback_headers = CallbackHeaders {
            client_id: header(headers, CLIENT_ID_HEADER),
            request_id: header(headers, REQUEST_ID_HEADER),
            request_timestamp: header(headers, REQUEST_TIMESTAMP_HEADER),
            signature: header(headers, SIGNATURE_HEADER),
        };

        let body = axum::body::to_bytes(req.into_body(), MAX_NOTIFICATION_BODY)
            .await
            .map_err(|_| RawNotificationError::BodyReadError)?;

        Ok(RawNotification(InboundNotification {
            headers: callback_headers,
            body: body.to_vec(),
        }))
    }
}
