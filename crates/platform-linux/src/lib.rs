//! Check-in Linux Platform Integration
//!
//! - **Printing:** CUPS `lp` (or a configured replacement)
//! - **Camera:** Video4Linux devices via `v4l2src`
//! - **Alerts:** terminal bell, plus an optional sound through `paplay`
//! - **Permissions:** capability detection and user guidance

pub mod permissions;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use checkin_common::error::CheckinResult;
use checkin_platform_core::{
    lp_args, run_print_command, spawn_reaped, terminal_bell, AlertKind, Capability,
    HostServices, PrintTarget,
};

/// Host services for Linux desktops and kiosks.
#[derive(Debug, Clone, Default)]
pub struct LinuxHost {
    alert_sound: Option<PathBuf>,
}

impl LinuxHost {
    pub fn new(alert_sound: Option<PathBuf>) -> Self {
        Self { alert_sound }
    }
}

impl HostServices for LinuxHost {
    fn name(&self) -> &str {
        "linux"
    }

    fn print_document(&self, path: &Path, target: &PrintTarget) -> CheckinResult<()> {
        let mut cmd = Command::new(&target.command);
        cmd.args(lp_args(path, target));
        run_print_command(cmd, &target.command)
    }

    fn alert(&self, kind: AlertKind, detail: &str) {
        eprintln!("!! {}: {detail}", kind.as_str());
        terminal_bell();

        if let Some(sound) = self.alert_sound.as_ref() {
            // The scan loop must not wait on audio.
            let mut cmd = Command::new("paplay");
            cmd.arg(sound).stdout(Stdio::null()).stderr(Stdio::null());
            if let Err(e) = spawn_reaped(cmd, "paplay") {
                tracing::debug!(error = %e, "paplay unavailable for alert sound");
            }
        }
    }

    fn camera_source(&self, index: u32) -> String {
        format!("v4l2src device=\"{}\"", video_device_path(index))
    }

    fn check_capabilities(&self, target: &PrintTarget) -> Vec<Capability> {
        permissions::check_capabilities(target)
    }
}

/// Device node for a camera index.
pub fn video_device_path(index: u32) -> String {
    format!("/dev/video{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_source_uses_indexed_v4l2_node() {
        let host = LinuxHost::default();
        assert_eq!(host.camera_source(2), "v4l2src device=\"/dev/video2\"");
    }

    #[test]
    fn print_failure_is_reported_not_panicked() {
        let host = LinuxHost::default();
        let target = PrintTarget {
            command: "checkin-no-such-print-command".to_string(),
            printer: None,
        };
        assert!(host
            .print_document(Path::new("/tmp/none.pdf"), &target)
            .is_err());
    }
}
