//! Wire types, request signing and the payment provider client for the
//! Boothpay kiosk bridge.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
