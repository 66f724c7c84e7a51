//! macOS host services.
//!
//! Printing goes through the bundled CUPS `lp`, cameras through
//! `avfvideosrc`, and alerts through `afplay`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use checkin_common::error::CheckinResult;
use checkin_platform_core::{
    command_exists, lp_args, run_print_command, spawn_reaped, terminal_bell, AlertKind,
    Capability, HostServices, PrintTarget,
};

const DEFAULT_ALERT_SOUND: &str = "/System/Library/Sounds/Basso.aiff";

#[derive(Debug, Clone)]
pub struct MacOSHost {
    alert_sound: PathBuf,
}

impl MacOSHost {
    pub fn new(alert_sound: Option<PathBuf>) -> Self {
        Self {
            alert_sound: alert_sound.unwrap_or_else(|| PathBuf::from(DEFAULT_ALERT_SOUND)),
        }
    }
}

impl Default for MacOSHost {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HostServices for MacOSHost {
    fn name(&self) -> &str {
        "macos"
    }

    fn print_document(&self, path: &Path, target: &PrintTarget) -> CheckinResult<()> {
        let mut cmd = Command::new(&target.command);
        cmd.args(lp_args(path, target));
        run_print_command(cmd, &target.command)
    }

    fn alert(&self, kind: AlertKind, detail: &str) {
        eprintln!("!! {}: {detail}", kind.as_str());
        terminal_bell();
        let mut cmd = Command::new("afplay");
        cmd.arg(&self.alert_sound)
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Err(e) = spawn_reaped(cmd, "afplay") {
            tracing::debug!(error = %e, "afplay unavailable for alert sound");
        }
    }

    fn camera_source(&self, index: u32) -> String {
        format!("avfvideosrc device-index={index}")
    }

    fn check_capabilities(&self, target: &PrintTarget) -> Vec<Capability> {
        vec![
            Capability::new(
                "Print Command",
                format!("`{}` for sending badges to the printer", target.command),
                command_exists(&target.command),
                true,
                "CUPS ships with macOS; check System Settings > Printers & Scanners",
            ),
            Capability::new(
                "Camera Access",
                "AVFoundation camera for live QR scanning",
                true,
                false,
                "",
            ),
            Capability::new(
                "PDF Rasterizer",
                "`pdftoppm` for reading QR codes from ticket PDFs",
                command_exists("pdftoppm"),
                false,
                "Install poppler: brew install poppler",
            ),
        ]
    }
}
