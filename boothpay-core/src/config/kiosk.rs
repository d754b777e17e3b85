//! Print kiosk configuration.

use url::Url;

/// Where the kiosk trigger call goes.
#[derive(Debug, Clone, Default)]
pub struct KioskConfig {
    /// Kiosk trigger URL. May already carry query parameters (e.g. an API
    /// password). `None` disables triggering.
    pub endpoint: Option<Url>,
}
