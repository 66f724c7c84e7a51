//! Check-in Render Engine
//!
//! Produces one printable PDF badge per attendee: the category template as
//! full-page background, centred auto-fit name lines, and a QR code carrying
//! the attendee identifier.
//!
//! Text is measured and drawn with TrueType faces. A DejaVu face ships with
//! the crate; extra faces can be stacked behind it for scripts it lacks.

pub mod compositor;
pub mod export;
pub mod font;
pub mod qr;
pub mod text;

pub use compositor::{compose_badge, mm_to_pt, BadgeComposition, LineRole, QrPlacement, TextLine};
pub use export::BadgeRenderer;
pub use font::{BadgeFont, FontStack, Glyph, GlyphRun};
pub use text::{fit_font_size, title_case, upper_case};
