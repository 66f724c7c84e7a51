//! Summarize the attendee roster.

use checkin_common::config::AppConfig;
use checkin_roster::Roster;

pub fn run(config: AppConfig, json: bool) -> anyhow::Result<()> {
    let roster = Roster::load(&config.roster.path, &config.roster)?;

    if json {
        let attendees: Vec<_> = roster.iter().collect();
        println!("{}", serde_json::to_string_pretty(&attendees)?);
        return Ok(());
    }

    println!("Roster: {}", config.roster.path.display());
    println!("  Attendees: {}", roster.len());
    println!();

    println!("Categories:");
    for (label, count) in roster.category_counts() {
        println!("  {label:<24} {count}");
    }
    println!();

    let duplicates = roster.duplicate_ids();
    if duplicates.is_empty() {
        println!("No duplicate identifiers.");
    } else {
        println!("Duplicate identifiers ({}; the first row wins):", duplicates.len());
        for id in duplicates {
            let rows: Vec<String> = roster
                .iter()
                .filter(|a| &a.id == id)
                .map(|a| format!("row {} {} {}", a.row, a.first_name, a.last_name))
                .collect();
            println!("  {id}: {}", rows.join(", "));
        }
    }

    Ok(())
}
