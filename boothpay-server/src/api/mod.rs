//! HTTP API for the payment bridge.
//!
//! - `session`  – JSON checkout session creation
//! - `callback` – provider notifications and browser returns
//! - `status`   – status polling and manual kiosk replay
//! - `pages`    – HTML pages for the kiosk screen and the payer

pub mod callback;
pub mod cookies;
pub mod extractors;
pub mod pages;
pub mod session;
pub mod status;

use axum::Router;

use crate::state::AppState;

/// Build the API router with every endpoint.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(pages::router())
        .merge(session::router())
        .merge(callback::router())
        .merge(status::router())
}
