//! Render scan codes as PNG data URLs for the registration response.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Rgb};
use qrcode::QrCode;

/// Minimum rendered size in pixels; the frontend displays the ticket at 400px.
const MIN_DIMENSIONS: u32 = 400;

const DARK: Rgb<u8> = Rgb([0x1a, 0x1a, 0x2e]);
const LIGHT: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Render a scan code value into a `data:image/png;base64,...` URL.
///
/// # Errors
///
/// Returns an error if the value cannot be QR-encoded or the PNG encoder fails.
pub fn data_url(value: &str) -> Result<String> {
    let code = QrCode::new(value.as_bytes()).context("failed to encode QR value")?;

    let image = code
        .render::<Rgb<u8>>()
        .min_dimensions(MIN_DIMENSIONS, MIN_DIMENSIONS)
        .quiet_zone(true)
        .dark_color(DARK)
        .light_color(LIGHT)
        .build();

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .context("failed to encode QR image as PNG")?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(&png)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_has_png_prefix() -> Result<()> {
        let url = data_url("HACKWHACK-00000000-0000-4000-8000-000000000000")?;
        assert!(url.starts_with("data:image/png;base64,"));
        Ok(())
    }

    #[test]
    fn data_url_payload_is_valid_png() -> Result<()> {
        let url = data_url("HACKWHACK-test")?;
        let encoded = url
            .strip_prefix("data:image/png;base64,")
            .context("missing data URL prefix")?;
        let bytes = STANDARD.decode(encoded)?;
        // PNG magic number
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        Ok(())
    }

    #[test]
    fn distinct_values_render_distinct_images() -> Result<()> {
        assert_ne!(data_url("HACKWHACK-a")?, data_url("HACKWHACK-b")?);
        Ok(())
    }
}
