//! Check-in Capture Engine
//!
//! Runs the camera scan loop and the one-shot ticket path. Both route a
//! decoded code through roster lookup, badge rendering and, for the scan
//! loop, printing.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                   ScanSession                    │
//! │  ┌─────────────┐  ┌──────────┐  ┌──────────────┐ │
//! │  │ FrameSource │─►│ decode   │─►│ seen set     │ │
//! │  │ (GstCamera) │  │ frame    │  │ + Roster     │ │
//! │  └─────────────┘  └──────────┘  └──────┬───────┘ │
//! │                                        ▼         │
//! │  ┌──────────────────┐      ┌──────────────────┐  │
//! │  │ HostServices     │◄─────│ BadgeRenderer    │  │
//! │  │ print / alert    │      │ <id>.pdf         │  │
//! │  └──────────────────┘      └──────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod camera;
pub mod pipeline;
pub mod session;
pub mod ticket;

pub use backend::{host_services, print_target};
pub use camera::FrameSource;
pub use pipeline::GstCamera;
pub use session::*;
pub use ticket::{process_ticket, ticket_badge_path, TicketOutcome};
