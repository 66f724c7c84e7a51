//! Render the badge for one identifier.

use checkin_capture_engine::{badge_path, host_services, print_target};
use checkin_common::config::AppConfig;
use checkin_roster::Identifier;

use super::Station;

pub fn run(config: AppConfig, raw_id: String, print: bool) -> anyhow::Result<()> {
    let station = Station::prepare(&config)?;

    let id = Identifier::new(&raw_id);
    let attendee = station
        .roster
        .lookup(&id)
        .ok_or_else(|| anyhow::anyhow!("No attendee with identifier {id}"))?;

    let path = station
        .renderer
        .render(attendee, &badge_path(&station.output_dir, &id))?;
    println!(
        "Badge for {} {} written to {}",
        attendee.first_name,
        attendee.last_name,
        path.display()
    );

    if print {
        let host = host_services(&config.printing);
        host.print_document(&path, &print_target(&config.printing))?;
        println!("Sent to printer via {}", host.name());
    }

    Ok(())
}
