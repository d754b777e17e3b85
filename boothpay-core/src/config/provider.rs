//! Payment provider configuration.

use url::Url;

/// Credentials and checkout defaults for the payment provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.doku.com`.
    pub base_url: Url,
    /// Provider-assigned client identifier.
    pub client_id: String,
    /// Secret key bytes for HMAC signing.
    pub secret: Box<[u8]>,
    /// Currency code put on every checkout order.
    pub currency: String,
    /// Minutes until a checkout page expires.
    pub payment_due_minutes: u32,
}

impl ProviderConfig {
    /// Get the secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}
