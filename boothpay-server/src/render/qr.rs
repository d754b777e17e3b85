//! QR code rendering for checkout links.

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;
use thiserror::Error;

/// Smallest edge length of a rendered QR image, in pixels.
const QR_MIN_SIZE: u32 = 320;

/// Errors produced while rendering a QR code.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("failed to write PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// Render `data` as a QR code and return it as a `data:image/png;base64,…` URL.
pub fn qr_data_url(data: &str) -> Result<String, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(format!(
        "data:image/png;base64,{}",
        fast32::base64::RFC4648.encode(&png)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_is_png() {
        let url = qr_data_url("https://checkout.example/p/1").unwrap();
        let encoded = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = fast32::base64::RFC4648.decode_str(encoded).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_rendering_is_stable() {
        let first = qr_data_url("https://checkout.example/p/1").unwrap();
        let second = qr_data_url("https://checkout.example/p/1").unwrap();
        assert_eq!(first, second);
    }
}
