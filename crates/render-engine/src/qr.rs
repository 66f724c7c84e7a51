//! QR code generation for badge payloads.

use checkin_common::error::{CheckinError, CheckinResult};
use image::{GrayImage, Luma};
use qrcode::QrCode;

/// Light modules around the symbol, as required by ISO/IEC 18004.
pub const QUIET_ZONE_MODULES: u32 = 4;

/// Render `payload` at one pixel per module, quiet zone included.
///
/// The PDF scales the image to its physical size with interpolation off,
/// so module edges stay sharp at any printer resolution.
pub fn qr_module_image(payload: &str) -> CheckinResult<GrayImage> {
    let code = QrCode::new(payload.as_bytes())
        .map_err(|e| CheckinError::render(format!("QR encode error: {e}")))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let size = modules + 2 * QUIET_ZONE_MODULES;

    let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));
    for (i, color) in colors.iter().enumerate() {
        if *color == qrcode::Color::Dark {
            let x = (i as u32) % modules + QUIET_ZONE_MODULES;
            let y = (i as u32) / modules + QUIET_ZONE_MODULES;
            img.put_pixel(x, y, Luma([0u8]));
        }
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_code_reader::decode_frame;
    use image::imageops::{resize, FilterType};

    #[test]
    fn module_image_is_square_with_quiet_zone() {
        let img = qr_module_image("12345678901").unwrap();
        assert_eq!(img.width(), img.height());
        // Version 1 symbol: 21 modules.
        assert_eq!(img.width(), 21 + 2 * QUIET_ZONE_MODULES);
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        assert_eq!(
            img.get_pixel(QUIET_ZONE_MODULES, QUIET_ZONE_MODULES).0[0],
            0
        );
    }

    #[test]
    fn payload_round_trips_through_decoder() {
        let img = qr_module_image("12345678901").unwrap();
        let scaled = resize(&img, img.width() * 8, img.height() * 8, FilterType::Nearest);
        assert_eq!(decode_frame(&scaled).as_deref(), Some("12345678901"));
    }
}
