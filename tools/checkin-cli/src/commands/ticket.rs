//! Process one ticket document offline.

use std::path::PathBuf;

use checkin_capture_engine::{process_ticket, TicketOutcome};
use checkin_common::config::AppConfig;

use super::Station;

pub fn run(config: AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let station = Station::prepare(&config)?;

    println!("Processing ticket: {}", path.display());
    let outcome = process_ticket(
        &path,
        &station.roster,
        &station.renderer,
        &station.output_dir,
        config.scanner.raster_dpi,
    )?;

    match outcome {
        TicketOutcome::NoCode => println!("[NO CODE] No QR code found on page 1"),
        TicketOutcome::Unknown(id) => println!("[UNKNOWN] {id} is not in the roster"),
        TicketOutcome::BadgeWritten { id, path } => {
            println!("[OK] Badge for {id} written to {}", path.display())
        }
    }

    Ok(())
}
