//! Application state shared across all request handlers.

use crate::config::runtime::AppConfig;
use boothpay_core::processors::{CallbackProcessor, KioskTrigger};
use boothpay_sdk::client::DokuClient;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around. The configuration is fixed at
/// startup and never changes.
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration.
    pub config: Arc<AppConfig>,
    /// Payment provider client.
    pub doku: DokuClient,
    /// Callback verification and kiosk triggering.
    pub callbacks: CallbackProcessor,
}

impl AppState {
    /// Create a new AppState, wiring every component from the configuration.
    pub fn new(config: AppConfig) -> Self {
        let provider = Arc::new(config.provider.clone());
        let doku = DokuClient::new(
            provider.base_url.clone(),
            provider.client_id.clone(),
            provider.secret_bytes().to_vec(),
        )
        .with_currency(provider.currency.clone())
        .with_payment_due_minutes(provider.payment_due_minutes);
        let kiosk = KioskTrigger::new(&config.kiosk);
        let callbacks = CallbackProcessor::new(provider, doku.clone(), kiosk);

        Self {
            config: Arc::new(config),
            doku,
            callbacks,
        }
    }
}
