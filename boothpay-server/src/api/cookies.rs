//! The invoice cookie.
//!
//! Some provider redirects drop the `?invoice=` query parameter, so the
//! invoice number is also parked in a short-lived cookie that the browser
//! return handler falls back to. It is deliberately readable from scripts.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{HeaderName, header, request::Parts};
use cookie::{Cookie, SameSite};

/// Name of the cookie carrying the invoice number.
pub const INVOICE_COOKIE: &str = "doku_inv";

/// Lifetime of the invoice cookie.
const INVOICE_COOKIE_MAX_AGE: cookie::time::Duration = cookie::time::Duration::minutes(30);

/// Build the invoice cookie.
pub fn invoice_cookie(invoice_number: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((INVOICE_COOKIE, invoice_number.to_owned()))
        .max_age(INVOICE_COOKIE_MAX_AGE)
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .build()
}

/// Response headers setting the invoice cookie.
pub fn set_invoice_cookie(invoice_number: &str, secure: bool) -> [(HeaderName, String); 1] {
    [(
        header::SET_COOKIE,
        invoice_cookie(invoice_number, secure).to_string(),
    )]
}

/// Extracts the invoice number from the `doku_inv` cookie, if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceCookie(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for InvoiceCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let invoice = parts
            .headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value.to_owned()))
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == INVOICE_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .filter(|value| !value.is_empty());
        Ok(InvoiceCookie(invoice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_cookie_attributes() {
        let rendered = invoice_cookie("INV-1", true).to_string();
        assert!(rendered.starts_with("doku_inv=INV-1"));
        assert!(rendered.contains("Max-Age=1800"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));
        assert!(!rendered.contains("HttpOnly"));
    }

    #[test]
    fn test_insecure_cookie() {
        assert!(!invoice_cookie("INV-1", false).to_string().contains("Secure"));
    }

    #[tokio::test]
    async fn test_extract_invoice_cookie() {
        let (mut parts, ()) = Request::builder()
            .header(header::COOKIE, "theme=dark; doku_inv=INV-7")
            .body(())
            .unwrap()
            .into_parts();
        let InvoiceCookie(invoice) = InvoiceCookie::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(invoice.as_deref(), Some("INV-7"));
    }

    #[tokio::test]
    async fn test_missing_invoice_cookie() {
        let (mut parts, ()) = Request::builder()
            .header(header::COOKIE, "doku_inv=")
            .body(())
            .unwrap()
            .into_parts();
        let InvoiceCookie(invoice) = InvoiceCookie::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(invoice.is_none());
    }
}
