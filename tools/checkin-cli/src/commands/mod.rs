//! Subcommand implementations.

use std::path::PathBuf;

use checkin_common::config::{AppConfig, BadgeCategory};
use checkin_render_engine::{BadgeRenderer, FontStack};
use checkin_roster::Roster;
use clap::Args;

pub mod badge;
pub mod check;
pub mod init;
pub mod roster;
pub mod scan;
pub mod ticket;

/// Overrides shared by every command that renders badges.
#[derive(Args, Debug, Default)]
pub struct StationArgs {
    /// Badge category: ATTENDEE, SPEAKER, SPONSOR, or VOLUNTEER
    #[arg(short = 'c', long)]
    pub category: Option<BadgeCategory>,

    /// Roster CSV path
    #[arg(long)]
    pub roster: Option<PathBuf>,

    /// Directory holding <CATEGORY>.png templates
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Root directory for generated badges
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl StationArgs {
    /// Command-line values win over the config file.
    pub fn apply(self, config: &mut AppConfig) {
        if let Some(category) = self.category {
            config.badge.category = category;
        }
        if let Some(roster) = self.roster {
            config.roster.path = roster;
        }
        if let Some(dir) = self.template_dir {
            config.badge.template_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.badge.output_dir = dir;
        }
    }
}

/// Everything a rendering command needs, checked at startup.
pub struct Station {
    pub roster: Roster,
    pub renderer: BadgeRenderer,
    pub output_dir: PathBuf,
}

impl Station {
    /// Load the roster, fonts and template and create the output directory.
    /// Any failure here is fatal.
    pub fn prepare(config: &AppConfig) -> anyhow::Result<Self> {
        let roster = Roster::load(&config.roster.path, &config.roster)?;
        let fonts = FontStack::load(
            config.badge.font_path.as_deref(),
            &config.badge.fallback_fonts,
        )?;
        let renderer = BadgeRenderer::new(
            &config.badge.template_path(),
            config.badge.layout.clone(),
            fonts,
        )?;
        let output_dir = config.badge.category_output_dir();
        std::fs::create_dir_all(&output_dir)?;

        tracing::info!(
            category = %config.badge.category,
            attendees = roster.len(),
            output = %output_dir.display(),
            "Station ready"
        );

        Ok(Self {
            roster,
            renderer,
            output_dir,
        })
    }
}
