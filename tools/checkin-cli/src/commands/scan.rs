//! Run the camera scan loop.

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use checkin_capture_engine::{host_services, print_target, GstCamera, ScanOptions, ScanSession};
use checkin_common::config::AppConfig;

use super::Station;

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let station = Station::prepare(&config)?;
    let host = host_services(&config.printing);
    let source = host.camera_source(config.scanner.camera_index);
    let camera = GstCamera::open(&source)?;

    let options = ScanOptions {
        output_dir: station.output_dir.clone(),
        print: config
            .printing
            .enabled
            .then(|| print_target(&config.printing)),
        scan_interval_ms: config.scanner.scan_interval_ms,
    };

    println!("Check-in scanner: {}", config.badge.category);
    println!("  Roster: {} ({} attendees)", config.roster.path.display(), station.roster.len());
    println!("  Camera: {source}");
    println!("  Output: {}", station.output_dir.display());
    match (&options.print, &config.printing.printer) {
        (None, _) => println!("  Printing: disabled"),
        (Some(_), Some(printer)) => println!("  Printing: {printer}"),
        (Some(_), None) => println!("  Printing: system default"),
    }
    println!();
    println!("Press Ctrl+C or type q + Enter to stop scanning...");
    println!();

    let mut session = ScanSession::new(
        Box::new(camera),
        station.roster,
        station.renderer,
        host,
        options,
    )?;

    let stop_flag = Arc::new(AtomicBool::new(false));
    watch_ctrl_c(stop_flag.clone());
    watch_stdin(stop_flag.clone());

    let loop_flag = stop_flag.clone();
    let stats = tokio::task::spawn_blocking(move || session.run(&loop_flag)).await?;

    println!();
    println!("Scan session finished:");
    println!("  Frames:     {}", stats.frames);
    println!("  Decoded:    {}", stats.decoded);
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Rendered:   {}", stats.rendered);
    println!("  Printed:    {}", stats.printed);
    println!("  Unknown:    {}", stats.unknown);
    println!("  Failed:     {}", stats.failed);
    println!("  Cam errors: {}", stats.source_errors);

    Ok(())
}

fn watch_ctrl_c(stop_flag: Arc<AtomicBool>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received");
            stop_flag.store(true, Ordering::SeqCst);
        }
    });
}

/// A plain thread rather than a blocking task: a pending stdin read must not
/// keep the runtime alive at shutdown.
fn watch_stdin(stop_flag: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if is_quit_command(&line) {
                tracing::info!("Quit requested from terminal");
                stop_flag.store(true, Ordering::SeqCst);
                break;
            }
        }
    });
}

fn is_quit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("q")
}
