//! Frame sources for the scan loop.

use checkin_common::error::CheckinResult;
use image::GrayImage;

/// Anything that can hand the scan loop one grayscale frame at a time.
///
/// Implementations own their device. `release` must be idempotent and is
/// also expected to run from `Drop`.
pub trait FrameSource: Send {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Next available frame. `Ok(None)` means nothing arrived within the
    /// source's bounded wait; the caller should simply try again.
    fn next_frame(&mut self) -> CheckinResult<Option<GrayImage>>;

    /// Give the device back to the system.
    fn release(&mut self);
}
