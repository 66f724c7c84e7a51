//! Check-in platform core contracts.
//!
//! The host-dependent parts of the station (printing a document, sounding
//! an alert, naming the camera source) sit behind [`HostServices`]. Each
//! platform crate ships one implementation; the capture engine picks one at
//! startup.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use checkin_common::error::{CheckinError, CheckinResult};
use serde::{Deserialize, Serialize};

/// Why the operator is being alerted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// A code was decoded but no roster row matched.
    UnknownAttendee,
    /// Rendering or printing a matched badge failed.
    BadgeFailed,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::UnknownAttendee => "unknown_attendee",
            AlertKind::BadgeFailed => "badge_failed",
        }
    }
}

/// Where a document should be printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintTarget {
    /// Print command for hosts that shell out (`lp` by default).
    pub command: String,
    /// Named printer; `None` means the system default.
    pub printer: Option<String>,
}

/// Host capabilities used by the scan loop.
pub trait HostServices: Send + Sync {
    /// Platform name for logging.
    fn name(&self) -> &str;

    /// Send a finished document to the printer.
    fn print_document(&self, path: &Path, target: &PrintTarget) -> CheckinResult<()>;

    /// Audible and visual operator alert. Never fails; problems are logged.
    fn alert(&self, kind: AlertKind, detail: &str);

    /// GStreamer source element description for the indexed camera.
    fn camera_source(&self, index: u32) -> String;

    /// Capability report for `checkin check`.
    fn check_capabilities(&self, target: &PrintTarget) -> Vec<Capability>;
}

/// A system capability the station may need.
#[derive(Debug, Clone)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

impl Capability {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        available: bool,
        required: bool,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            available,
            required,
            fix_instructions: if available { None } else { Some(fix.into()) },
        }
    }
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Check-in Station Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}

/// Whether `binary` resolves on the Unix `PATH`.
///
/// The name is passed to the shell as a positional parameter and never
/// parsed as script text.
pub fn command_exists(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg("command -v \"$1\" >/dev/null 2>&1")
        .arg("sh")
        .arg(binary)
        .stdin(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Start `cmd` without waiting for it. A detached thread waits on the child
/// so it is reaped when it exits.
pub fn spawn_reaped(
    mut cmd: Command,
    label: &str,
) -> std::io::Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = cmd.stdin(Stdio::null()).spawn()?;
    let label = label.to_string();
    std::thread::Builder::new()
        .name(format!("reap-{label}"))
        .spawn(move || match child.wait() {
            Ok(status) => {
                if !status.success() {
                    tracing::debug!(command = %label, %status, "Helper exited with failure");
                }
                Some(status)
            }
            Err(e) => {
                tracing::debug!(command = %label, error = %e, "Failed to wait on helper");
                None
            }
        })
}

/// Run a command to completion and turn a non-zero exit into a print error.
pub fn run_print_command(mut cmd: Command, label: &str) -> CheckinResult<()> {
    tracing::debug!(command = ?cmd, "Dispatching print job");
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CheckinError::print(format!("Failed to start {label}: {e}")))?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::info!(job = %stdout.trim(), "Print job accepted");
        }
        Ok(())
    } else {
        Err(CheckinError::print(format!(
            "{label} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// `lp`-style argument list: `[-d <printer>] <path>`.
pub fn lp_args(path: &Path, target: &PrintTarget) -> Vec<std::ffi::OsString> {
    let mut args = Vec::new();
    if let Some(printer) = target.printer.as_deref() {
        args.push("-d".into());
        args.push(printer.into());
    }
    args.push(path.as_os_str().to_owned());
    args
}

/// Ring the terminal bell on stderr.
pub fn terminal_bell() {
    use std::io::Write;
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}
