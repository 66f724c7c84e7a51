//! One-shot ticket processing for offline testing.
//!
//! Reads page 1 of a ticket document (or a ticket image), decodes its code,
//! looks it up and renders a badge. Nothing is printed and no seen set is
//! involved.

use std::path::{Path, PathBuf};

use checkin_code_reader::{decode_frame, load_frame};
use checkin_common::error::CheckinResult;
use checkin_render_engine::BadgeRenderer;
use checkin_roster::{Identifier, Roster};

/// Result of processing one ticket document.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketOutcome {
    /// No readable code on the page.
    NoCode,
    /// Code decoded but not in the roster.
    Unknown(Identifier),
    /// Badge written.
    BadgeWritten { id: Identifier, path: PathBuf },
}

/// Output file for a badge produced from a ticket document.
pub fn ticket_badge_path(output_dir: &Path, id: &Identifier) -> PathBuf {
    output_dir.join(format!("test_{}.pdf", id.file_stem()))
}

/// Decode, look up and render once.
///
/// Reading the ticket and writing the badge are errors; a missing code or an
/// unknown identifier are outcomes.
pub fn process_ticket(
    ticket: &Path,
    roster: &Roster,
    renderer: &BadgeRenderer,
    output_dir: &Path,
    raster_dpi: u32,
) -> CheckinResult<TicketOutcome> {
    let frame = load_frame(ticket, raster_dpi)?;

    let Some(payload) = decode_frame(&frame) else {
        tracing::warn!(ticket = %ticket.display(), "No QR code found on ticket");
        return Ok(TicketOutcome::NoCode);
    };

    let id = Identifier::new(&payload);
    if id.is_empty() {
        tracing::warn!(ticket = %ticket.display(), "Ticket QR code holds only whitespace");
        return Ok(TicketOutcome::NoCode);
    }
    let Some(attendee) = roster.lookup(&id) else {
        tracing::warn!(ticket = %ticket.display(), %id, "Ticket code not in roster");
        return Ok(TicketOutcome::Unknown(id));
    };

    let path = renderer.render(attendee, &ticket_badge_path(output_dir, &id))?;
    tracing::info!(ticket = %ticket.display(), %id, path = %path.display(), "Ticket badge written");
    Ok(TicketOutcome::BadgeWritten { id, path })
}
