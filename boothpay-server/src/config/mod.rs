//! Configuration module for boothpay-server.
//!
//! Handles loading configuration from environment variables and CLI
//! arguments, validating it, and building the immutable [`AppConfig`].

pub mod env;
pub mod runtime;

use crate::config::env::{EnvConfig, split_csv};
use crate::config::runtime::{
    AppConfig, ConfigError, KioskConfig, ProviderConfig, PublicConfig, ServerConfig,
};
use std::net::SocketAddr;
use url::Url;

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    env: EnvConfig,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(env: EnvConfig) -> Self {
        Self { env }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Parse every URL setting
    /// 2. Validate the configuration
    /// 3. Build the runtime configuration
    pub fn load(self) -> Result<AppConfig, ConfigError> {
        self.validate()?;
        let env = self.env;

        let base_url = parse_url("DOKU_BASE_URL", env.doku_base_url.trim_end_matches('/'))?;
        let public_base_url = non_blank(env.public_base_url)
            .map(|url| parse_url("PUBLIC_BASE_URL", url.trim_end_matches('/')))
            .transpose()?;
        let kiosk_endpoint = non_blank(env.dslrbooth_api_url)
            .map(|url| parse_url("DSLRBOOTH_API_URL", &url))
            .transpose()?;

        if env.doku_client_id.is_empty() || env.doku_secret_key.is_empty() {
            tracing::warn!("DOKU_CLIENT_ID or DOKU_SECRET_KEY is empty, provider calls will fail");
        }
        if public_base_url.is_none() {
            tracing::warn!("PUBLIC_BASE_URL is not set, checkout sessions cannot be created");
        }

        Ok(AppConfig {
            server: ServerConfig {
                listen: SocketAddr::new(env.host, env.port),
            },
            provider: ProviderConfig {
                base_url,
                client_id: env.doku_client_id,
                secret: env.doku_secret_key.into_bytes().into_boxed_slice(),
                currency: env.doku_currency,
                payment_due_minutes: env.doku_payment_due_minutes,
            },
            public: PublicConfig {
                base_url: public_base_url,
                default_payment_methods: split_csv(&env.default_payment_methods),
            },
            kiosk: KioskConfig {
                endpoint: kiosk_endpoint,
            },
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.env.doku_currency.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "DOKU_CURRENCY must not be empty".to_string(),
            ));
        }
        if self.env.doku_payment_due_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "DOKU_PAYMENT_DUE_MINUTES must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { name, source })
}
