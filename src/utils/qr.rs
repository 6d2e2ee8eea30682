use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;

use crate::utils::error::{AppError, Result};

const MIN_DIMENSION: u32 = 240;

/// Renders `data` as an SVG QR code wrapped in a `data:` URL, ready for an
/// `<img src>` on the holder's dashboard.
pub fn render_data_url(data: &str) -> Result<String> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| AppError::InternalServerError(format!("failed to encode QR code: {}", e)))?;

    let image = code
        .render::<svg::Color<'_>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_svg_data_url() {
        let url = render_data_url(r#"{"passId":"abc"}"#).unwrap();
        let encoded = url.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_oversized_payload_is_an_error() {
        let huge = "x".repeat(8_000);
        assert!(render_data_url(&huge).is_err());
    }
}
