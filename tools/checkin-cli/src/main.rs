//! Check-in CLI: scan tickets, render badges, print them.
//!
//! Usage:
//!   checkin scan [OPTIONS]       Run the camera scan loop
//!   checkin ticket <PATH>        Process one ticket document offline
//!   checkin badge <ID>           Render (and optionally print) one badge
//!   checkin roster               Summarize the attendee roster
//!   checkin check                Check system capabilities
//!   checkin init                 Write a default configuration file

use std::path::PathBuf;

use checkin_common::config::AppConfig;
use clap::{Parser, Subcommand};

mod commands;

use commands::StationArgs;

#[derive(Parser)]
#[command(
    name = "checkin",
    about = "Event check-in station: QR scan to printed badge",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to $XDG_CONFIG_HOME/checkin/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan codes from the camera and print badges until aborted
    Scan {
        #[command(flatten)]
        station: StationArgs,

        /// Zero-based camera index
        #[arg(long)]
        camera: Option<u32>,

        /// Named printer instead of the system default
        #[arg(long)]
        printer: Option<String>,

        /// Render badges without printing them
        #[arg(long)]
        no_print: bool,

        /// Minimum milliseconds between frame pulls
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Decode a ticket document once and write a test badge
    Ticket {
        /// Ticket PDF or image
        path: PathBuf,

        #[command(flatten)]
        station: StationArgs,

        /// Rasterization resolution for PDF tickets
        #[arg(long)]
        dpi: Option<u32>,
    },

    /// Render the badge for one identifier without scanning
    Badge {
        /// Order identifier (only the first 11 characters are used)
        id: String,

        #[command(flatten)]
        station: StationArgs,

        /// Also send the badge to the printer
        #[arg(long)]
        print: bool,

        /// Named printer instead of the system default
        #[arg(long)]
        printer: Option<String>,
    },

    /// Show roster size, categories, and duplicate identifiers
    Roster {
        /// Roster CSV path
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Print every attendee as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check system capabilities
    Check {
        #[command(flatten)]
        station: StationArgs,
    },

    /// Write a default configuration file
    Init {
        /// Destination (defaults to the standard config location)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match (&cli.command, cli.config.as_deref()) {
        (Commands::Init { .. }, _) => AppConfig::default(),
        (_, Some(path)) => AppConfig::load_from(path)?,
        (_, None) => AppConfig::load(),
    };

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    checkin_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Scan {
            station,
            camera,
            printer,
            no_print,
            interval_ms,
        } => {
            station.apply(&mut config);
            if let Some(camera) = camera {
                config.scanner.camera_index = camera;
            }
            if let Some(interval_ms) = interval_ms {
                config.scanner.scan_interval_ms = interval_ms;
            }
            if printer.is_some() {
                config.printing.printer = printer;
            }
            if no_print {
                config.printing.enabled = false;
            }
            commands::scan::run(config).await
        }
        Commands::Ticket { path, station, dpi } => {
            station.apply(&mut config);
            if let Some(dpi) = dpi {
                config.scanner.raster_dpi = dpi;
            }
            commands::ticket::run(config, path)
        }
        Commands::Badge {
            id,
            station,
            print,
            printer,
        } => {
            station.apply(&mut config);
            if printer.is_some() {
                config.printing.printer = printer;
            }
            commands::badge::run(config, id, print)
        }
        Commands::Roster { roster, json } => {
            if let Some(roster) = roster {
                config.roster.path = roster;
            }
            commands::roster::run(config, json)
        }
        Commands::Check { station } => {
            station.apply(&mut config);
            commands::check::run(config)
        }
        Commands::Init { output, force } => {
            commands::init::run(config, output.or(cli.config), force)
        }
    }
}
