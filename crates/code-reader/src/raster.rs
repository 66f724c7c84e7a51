//! Frames from static documents.
//!
//! Ticket PDFs are rasterized with poppler's `pdftoppm`; raster images are
//! decoded directly.

use std::path::Path;
use std::process::{Command, Stdio};

use checkin_common::error::{CheckinError, CheckinResult};
use image::GrayImage;

/// Load a frame from a ticket file: page 1 for PDFs, the image otherwise.
pub fn load_frame(path: &Path, dpi: u32) -> CheckinResult<GrayImage> {
    if !path.exists() {
        return Err(CheckinError::file_not_found(path));
    }

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        rasterize_first_page(path, dpi)
    } else {
        let image = image::open(path).map_err(|e| {
            CheckinError::decode(format!("Failed to read image {}: {e}", path.display()))
        })?;
        Ok(image.to_luma8())
    }
}

/// Rasterize page 1 of a PDF to a grayscale frame.
pub fn rasterize_first_page(pdf: &Path, dpi: u32) -> CheckinResult<GrayImage> {
    if !pdf.exists() {
        return Err(CheckinError::file_not_found(pdf));
    }

    let workdir = tempfile::tempdir()?;
    let root = workdir.path().join("page");

    let output = Command::new("pdftoppm")
        .args(["-f", "1", "-l", "1", "-singlefile", "-gray", "-png"])
        .arg("-r")
        .arg(dpi.max(1).to_string())
        .arg(pdf)
        .arg(&root)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CheckinError::decode(format!("Failed to start pdftoppm: {e}")))?;

    if !output.status.success() {
        return Err(CheckinError::decode(format!(
            "pdftoppm failed on {} ({}): {}",
            pdf.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let page_path = root.with_extension("png");
    let image = image::open(&page_path)
        .map_err(|e| CheckinError::decode(format!("Failed to read rasterized page: {e}")))?;

    tracing::debug!(
        pdf = %pdf.display(),
        width = image.width(),
        height = image.height(),
        dpi,
        "Rasterized ticket page"
    );
    Ok(image.to_luma8())
}
