//! Presentation helpers: HTML pages and QR images.

pub mod pages;
pub mod qr;

pub use qr::{QrError, qr_data_url};
