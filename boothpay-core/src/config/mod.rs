//! Configuration types for the Boothpay bridge.
//!
//! These types represent the validated runtime configuration. It is built
//! once at startup by the server crate and never mutated afterwards; every
//! component receives it explicitly.

mod kiosk;
mod provider;
mod public;
mod server;

pub use kiosk::KioskConfig;
pub use provider::ProviderConfig;
pub use public::PublicConfig;
pub use server::ServerConfig;

use thiserror::Error;

/// Errors raised while building or using the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PUBLIC_BASE_URL is not set")]
    MissingPublicBaseUrl,

    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// The complete, immutable runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address.
    pub server: ServerConfig,
    /// Payment provider credentials and checkout defaults.
    pub provider: ProviderConfig,
    /// How this service is reachable from the outside.
    pub public: PublicConfig,
    /// Print kiosk endpoint.
    pub kiosk: KioskConfig,
}
