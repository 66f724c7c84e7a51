//! QR detection and decoding.

use image::GrayImage;

/// Decode the first readable QR code in `frame`.
///
/// Every detected grid is tried in order; grids that fail to decode are
/// skipped. Returns `None` when nothing decodes. No retries.
pub fn decode_frame(frame: &GrayImage) -> Option<String> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            frame.get_pixel(x as u32, y as u32).0[0]
        });

    let grids = prepared.detect_grids();
    if grids.is_empty() {
        return None;
    }
    tracing::trace!(grids = grids.len(), "QR grids detected");

    for grid in grids {
        match grid.decode() {
            Ok((_meta, content)) => return Some(content),
            Err(e) => tracing::debug!(error = ?e, "QR grid failed to decode"),
        }
    }
    None
}
