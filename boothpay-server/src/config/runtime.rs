//! Runtime configuration re-exports.
//!
//! The actual config types are defined in `boothpay-core::config`.
//! This module re-exports them for convenience.

pub use boothpay_core::config::{
    AppConfig, ConfigError, KioskConfig, ProviderConfig, PublicConfig, ServerConfig,
};
