//! Windows host services.
//!
//! Documents are printed through the shell `Print` verb (or `PrintTo` for a
//! named printer), which hands the file to the registered PDF handler.

use std::path::Path;
use std::process::{Command, Stdio};

use checkin_common::error::CheckinResult;
use checkin_platform_core::{
    run_print_command, spawn_reaped, terminal_bell, AlertKind, Capability, HostServices,
    PrintTarget,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsHost;

impl WindowsHost {
    pub fn new() -> Self {
        Self
    }
}

impl HostServices for WindowsHost {
    fn name(&self) -> &str {
        "windows"
    }

    fn print_document(&self, path: &Path, target: &PrintTarget) -> CheckinResult<()> {
        let mut cmd = Command::new("powershell");
        cmd.args(["-NoProfile", "-NonInteractive", "-Command"])
            .arg(print_verb_script(path, target.printer.as_deref()));
        run_print_command(cmd, "powershell Start-Process")
    }

    fn alert(&self, kind: AlertKind, detail: &str) {
        eprintln!("!! {}: {detail}", kind.as_str());
        terminal_bell();
        let mut cmd = Command::new("powershell");
        cmd.args(["-NoProfile", "-Command", "[console]::beep(880,300)"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Err(e) = spawn_reaped(cmd, "powershell beep") {
            tracing::debug!(error = %e, "console beep unavailable");
        }
    }

    fn camera_source(&self, index: u32) -> String {
        format!("ksvideosrc device-index={index}")
    }

    fn check_capabilities(&self, _target: &PrintTarget) -> Vec<Capability> {
        let powershell = Command::new("powershell")
            .args(["-NoProfile", "-Command", "exit 0"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        let pdftoppm = Command::new("pdftoppm")
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok();

        vec![
            Capability::new(
                "PowerShell",
                "Shell print verb dispatch",
                powershell,
                true,
                "Ensure powershell.exe is on PATH",
            ),
            Capability::new(
                "PDF Rasterizer",
                "`pdftoppm` for reading QR codes from ticket PDFs",
                pdftoppm,
                false,
                "Install poppler for Windows and add its bin directory to PATH",
            ),
        ]
    }
}

/// PowerShell one-liner invoking the `Print`/`PrintTo` verb on `path`.
fn print_verb_script(path: &Path, printer: Option<&str>) -> String {
    let file = quote_ps(&path.to_string_lossy());
    match printer {
        Some(name) => format!(
            "Start-Process -FilePath {file} -Verb PrintTo -ArgumentList {} -WindowStyle Hidden",
            quote_ps(name)
        ),
        None => format!("Start-Process -FilePath {file} -Verb Print -WindowStyle Hidden"),
    }
}

fn quote_ps(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
