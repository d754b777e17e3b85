//! Public-facing configuration.

use url::Url;

use super::ConfigError;

/// How this service is reachable from the payer's browser and the provider.
#[derive(Debug, Clone, Default)]
pub struct PublicConfig {
    /// Externally reachable base URL. Required to build callback URLs.
    pub base_url: Option<Url>,
    /// Payment method codes offered by the quick-pay flow.
    pub default_payment_methods: Vec<String>,
}

impl PublicConfig {
    /// The base URL without a trailing slash, for building callback URLs.
    pub fn callback_base(&self) -> Result<String, ConfigError> {
        self.base_url
            .as_ref()
            .map(|url| url.as_str().trim_end_matches('/').to_string())
            .ok_or(ConfigError::MissingPublicBaseUrl)
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn cookie_secure(&self) -> bool {
        self.base_url
            .as_ref()
            .is_some_and(|url| url.scheme() == "https")
    }

    /// Where browsers land after returning from the checkout page. Falls back
    /// to the local listener when no public base URL is configured.
    pub fn landing_url(&self, port: u16) -> Result<Url, ConfigError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(&format!("http://localhost:{port}/")).map_err(|source| {
                ConfigError::InvalidUrl {
                    name: "landing URL",
                    source,
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public(base: Option<&str>) -> PublicConfig {
        PublicConfig {
            base_url: base.map(|b| Url::parse(b).unwrap()),
            default_payment_methods: vec!["QRIS".to_string()],
        }
    }

    #[test]
    fn test_callback_base_trims_slash() {
        let config = public(Some("https://booth.example.com/"));
        assert_eq!(config.callback_base().unwrap(), "https://booth.example.com");
    }

    #[test]
    fn test_callback_base_requires_public_url() {
        assert!(matches!(
            public(None).callback_base(),
            Err(ConfigError::MissingPublicBaseUrl)
        ));
    }

    #[test]
    fn test_cookie_secure_follows_scheme() {
        assert!(public(Some("https://booth.example.com")).cookie_secure());
        assert!(!public(Some("http://booth.local:3000")).cookie_secure());
        assert!(!public(None).cookie_secure());
    }

    #[test]
    fn test_landing_url_fallback() {
        assert_eq!(public(None).landing_url(3000).unwrap().as_str(), "http://localhost:3000/");
        assert_eq!(
            public(Some("https://booth.example.com")).landing_url(3000).unwrap().as_str(),
            "https://booth.example.com/"
        );
    }
}
