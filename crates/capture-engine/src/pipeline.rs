//! GStreamer camera source.
//!
//! The camera is opened once per run as
//! `<platform source> ! videoconvert ! GRAY8 ! appsink` and frames are pulled
//! with a bounded wait so the stop flag is checked even when the camera is
//! idle. A pipeline that errors out or reaches end of stream is restarted on
//! the following pull; a single malformed frame is skipped.

use std::sync::OnceLock;

use checkin_common::error::{CheckinError, CheckinResult};
use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use image::GrayImage;

use crate::camera::FrameSource;

/// Longest time a single frame pull may block.
pub const FRAME_PULL_TIMEOUT_MS: u64 = 500;

const APPSINK_NAME: &str = "frames";

/// Full launch line for a camera source element.
pub fn camera_launch_line(source: &str) -> String {
    format!(
        "{source} ! videoconvert ! video/x-raw,format=GRAY8 ! \
         appsink name={APPSINK_NAME} max-buffers=1 drop=true sync=false"
    )
}

pub struct GstCamera {
    name: String,
    pipeline: gst::Pipeline,
    sink: gst_app::AppSink,
    released: bool,
}

impl GstCamera {
    /// Open the camera described by `source` and start streaming.
    pub fn open(source: &str) -> CheckinResult<Self> {
        init_gstreamer()?;

        let launch = camera_launch_line(source);
        tracing::debug!(%launch, "Building camera pipeline");

        let element = gst::parse::launch(&launch)
            .map_err(|e| CheckinError::capture(format!("Failed to build pipeline: {e}")))?;
        let pipeline = element
            .dynamic_cast::<gst::Pipeline>()
            .map_err(|_| CheckinError::capture("Launch string did not produce a pipeline"))?;
        let sink = pipeline
            .by_name(APPSINK_NAME)
            .and_then(|e| e.dynamic_cast::<gst_app::AppSink>().ok())
            .ok_or_else(|| CheckinError::capture("Camera pipeline has no frame sink"))?;

        let mut camera = Self {
            name: source.to_string(),
            pipeline,
            sink,
            released: false,
        };
        camera.start()?;
        Ok(camera)
    }

    fn start(&mut self) -> CheckinResult<()> {
        self.pipeline.set_state(gst::State::Playing).map_err(|e| {
            CheckinError::capture(format!("Failed to start camera {}: {e:?}", self.name))
        })?;

        // Surface "device busy" and "no such device" here instead of on the
        // first pull.
        match self.pipeline.state(gst::ClockTime::from_seconds(10)) {
            (Ok(_), gst::State::Playing, _) => {}
            (Ok(_), state, _) => {
                tracing::warn!(camera = %self.name, ?state, "Camera did not reach Playing state within timeout");
            }
            (Err(e), _, _) => {
                let detail = self.bus_error().unwrap_or_else(|| format!("{e:?}"));
                return Err(CheckinError::capture(format!(
                    "Camera {} failed to start: {detail}",
                    self.name
                )));
            }
        }

        tracing::info!(camera = %self.name, "Camera opened");
        Ok(())
    }

    /// Tear the pipeline down and bring it back up. Failures are logged and
    /// surface again on the next pull.
    fn restart(&mut self) {
        tracing::info!(camera = %self.name, "Restarting camera pipeline");
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            tracing::warn!(camera = %self.name, error = ?e, "Failed to stop camera pipeline");
            return;
        }
        if let Err(e) = self.start() {
            tracing::warn!(camera = %self.name, error = %e, "Camera restart failed");
        }
    }

    fn bus_error(&self) -> Option<String> {
        let bus = self.pipeline.bus()?;
        let msg = bus.pop_filtered(&[gst::MessageType::Error])?;
        match msg.view() {
            gst::MessageView::Error(err) => Some(match err.debug() {
                Some(debug) => format!("{} ({debug})", err.error()),
                None => err.error().to_string(),
            }),
            _ => None,
        }
    }
}

impl FrameSource for GstCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn next_frame(&mut self) -> CheckinResult<Option<GrayImage>> {
        if self.released {
            return Err(CheckinError::capture("Camera already released"));
        }
        let fault = match self.bus_error() {
            Some(detail) => Some(format!("stopped: {detail}")),
            None if self.sink.is_eos() => Some("reached end of stream".to_string()),
            None => None,
        };
        if let Some(fault) = fault {
            self.restart();
            return Err(CheckinError::capture(format!(
                "Camera {} {fault}",
                self.name
            )));
        }

        let Some(sample) = self
            .sink
            .try_pull_sample(gst::ClockTime::from_mseconds(FRAME_PULL_TIMEOUT_MS))
        else {
            return Ok(None);
        };
        match sample_to_gray(&sample) {
            Ok(frame) => Ok(Some(frame)),
            Err(e) => {
                tracing::warn!(camera = %self.name, error = %e, "Skipping unreadable frame");
                Ok(None)
            }
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            tracing::warn!(camera = %self.name, error = ?e, "Failed to release camera");
        } else {
            tracing::info!(camera = %self.name, "Camera released");
        }
    }
}

impl Drop for GstCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// Copy a GRAY8 sample into a tightly packed image, dropping row padding.
fn sample_to_gray(sample: &gst::Sample) -> CheckinResult<GrayImage> {
    let caps = sample
        .caps()
        .ok_or_else(|| CheckinError::capture("Frame without caps"))?;
    let info = gst_video::VideoInfo::from_caps(caps)
        .map_err(|e| CheckinError::capture(format!("Unreadable frame caps: {e}")))?;
    let buffer = sample
        .buffer()
        .ok_or_else(|| CheckinError::capture("Frame without buffer"))?;
    let map = buffer
        .map_readable()
        .map_err(|e| CheckinError::capture(format!("Failed to map frame: {e}")))?;

    let width = info.width();
    let height = info.height();
    let stride = info.stride()[0] as usize;
    gray_from_strided(map.as_slice(), width, height, stride)
}

/// Pack `height` rows of `width` bytes taken every `stride` bytes.
pub fn gray_from_strided(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> CheckinResult<GrayImage> {
    let row_len = width as usize;
    if stride < row_len || data.len() < stride * (height as usize).saturating_sub(1) + row_len {
        return Err(CheckinError::capture(format!(
            "Frame buffer too small for {width}x{height} (stride {stride}, {} bytes)",
            data.len()
        )));
    }

    let mut packed = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        packed.extend_from_slice(&data[start..start + row_len]);
    }
    GrayImage::from_raw(width, height, packed)
        .ok_or_else(|| CheckinError::capture("Frame size mismatch"))
}

fn init_gstreamer() -> CheckinResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(CheckinError::capture(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_line_ends_in_gray_appsink() {
        let line = camera_launch_line("v4l2src device=\"/dev/video0\"");
        assert!(line.starts_with("v4l2src device=\"/dev/video0\" ! videoconvert"));
        assert!(line.contains("format=GRAY8"));
        assert!(line.contains("appsink name=frames"));
        assert!(line.contains("drop=true"));
    }

    #[test]
    fn strided_rows_are_packed() {
        // 3x2 image with 1 byte of padding per row.
        let data = [1, 2, 3, 0, 4, 5, 6, 0];
        let img = gray_from_strided(&data, 3, 2, 4).unwrap();
        assert_eq!(img.as_raw(), &vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn last_row_may_omit_padding() {
        let data = [1, 2, 0, 3, 4];
        let img = gray_from_strided(&data, 2, 2, 3).unwrap();
        assert_eq!(img.as_raw(), &vec![1, 2, 3, 4]);
    }

    #[test]
    fn short_buffer_is_rejected() {
        assert!(gray_from_strided(&[1, 2, 3], 2, 2, 2).is_err());
        assert!(gray_from_strided(&[0; 16], 4, 2, 3).is_err());
    }
}
