//! Check system capabilities.

use std::path::Path;

use checkin_capture_engine::{host_services, print_target};
use checkin_common::config::AppConfig;
use checkin_platform_core::{print_capability_report, Capability};

pub fn run(config: AppConfig) -> anyhow::Result<()> {
    println!("Check-in System Check");
    println!("{}", "=".repeat(50));

    let host = host_services(&config.printing);
    println!("[OK] Platform: {}", host.name());
    println!(
        "[OK] Camera source: {}",
        host.camera_source(config.scanner.camera_index)
    );

    let mut capabilities = host.check_capabilities(&print_target(&config.printing));
    capabilities.push(readable_file(
        "Roster",
        "Attendee CSV export",
        &config.roster.path,
        "Set roster.path in the config file or pass --roster",
    ));
    capabilities.push(readable_file(
        "Badge Template",
        &format!("Background for {} badges", config.badge.category),
        &config.badge.template_path(),
        "Place <CATEGORY>.png in badge.template_dir or pass --template-dir",
    ));
    for font in config
        .badge
        .font_path
        .iter()
        .chain(&config.badge.fallback_fonts)
    {
        capabilities.push(readable_file(
            "Badge Font",
            "TrueType face for name text",
            font,
            "Fix badge.font_path or badge.fallback_fonts in the config file",
        ));
    }

    println!();
    print_capability_report(&capabilities);

    let all_required_ok = capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available);

    println!();
    if all_required_ok {
        println!("All required capabilities are available. The station is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}

fn readable_file(name: &str, description: &str, path: &Path, fix: &str) -> Capability {
    Capability::new(
        name,
        format!("{description} ({})", path.display()),
        std::fs::File::open(path).is_ok(),
        true,
        fix,
    )
}
