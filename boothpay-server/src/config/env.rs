//! Environment-sourced configuration.
//!
//! Every setting can be given as an environment variable (optionally from a
//! `.env` file) or as the equivalent command line flag.

use std::net::IpAddr;

/// Raw settings as read from the environment, before validation.
#[derive(Debug, Clone, clap::Args)]
pub struct EnvConfig {
    /// Payment provider API root
    #[arg(long, env = "DOKU_BASE_URL", default_value = "https://api.doku.com")]
    pub doku_base_url: String,

    /// Provider-assigned client identifier
    #[arg(long, env = "DOKU_CLIENT_ID", default_value = "")]
    pub doku_client_id: String,

    /// Shared secret used for request signing
    #[arg(long, env = "DOKU_SECRET_KEY", default_value = "", hide_env_values = true)]
    pub doku_secret_key: String,

    /// Currency of every checkout order
    #[arg(long, env = "DOKU_CURRENCY", default_value = "IDR")]
    pub doku_currency: String,

    /// Minutes until a checkout page expires
    #[arg(long, env = "DOKU_PAYMENT_DUE_MINUTES", default_value_t = 5)]
    pub doku_payment_due_minutes: u32,

    /// Externally reachable base URL of this service
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Print kiosk trigger URL
    #[arg(long, env = "DSLRBOOTH_API_URL")]
    pub dslrbooth_api_url: Option<String>,

    /// Comma-separated payment method codes for the quick-pay flow
    #[arg(long, env = "DEFAULT_PAYMENT_METHODS", default_value = "QRIS")]
    pub default_payment_methods: String,

    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
