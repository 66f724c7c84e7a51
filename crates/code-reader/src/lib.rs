//! Check-in Code Reader
//!
//! Turns a single grayscale frame into a QR payload. Frames come from the
//! camera or from page 1 of a ticket document:
//!
//! ```text
//! camera frame ─────────────┐
//!                           ├── decode_frame ──► Option<String>
//! ticket.pdf ── rasterize ──┘
//! ```

pub mod decode;
pub mod raster;

pub use decode::decode_frame;
pub use raster::{load_frame, rasterize_first_page};
