//! Write a default configuration file.

use std::path::PathBuf;

use checkin_common::config::{config_file_path, AppConfig};

pub fn run(config: AppConfig, output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    config.save_to(&path)?;

    println!("Configuration written to {}", path.display());
    println!();
    println!("Expected layout:");
    println!("  {}", config.roster.path.display());
    println!("  {}/", config.badge.template_dir.display());
    println!("  ├── ATTENDEE.png");
    println!("  ├── SPEAKER.png");
    println!("  ├── SPONSOR.png");
    println!("  └── VOLUNTEER.png");
    println!("  {}/<CATEGORY>/   (generated badges)", config.badge.output_dir.display());

    Ok(())
}
