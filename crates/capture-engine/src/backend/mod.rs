//! Host service selection.

use checkin_common::config::PrintConfig;
use checkin_platform_core::{HostServices, PrintTarget};

pub use checkin_platform_linux::LinuxHost;
pub use checkin_platform_macos::MacOSHost;
pub use checkin_platform_windows::WindowsHost;

/// Get the platform-specific host services.
pub fn host_services(config: &PrintConfig) -> Box<dyn HostServices> {
    #[cfg(target_os = "windows")]
    {
        let _ = config;
        Box::new(WindowsHost::new())
    }
    #[cfg(target_os = "macos")]
    {
        Box::new(MacOSHost::new(config.alert_sound.clone()))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // Every other Unix gets the CUPS `lp` path.
        Box::new(LinuxHost::new(config.alert_sound.clone()))
    }
}

/// Print destination derived from configuration.
pub fn print_target(config: &PrintConfig) -> PrintTarget {
    PrintTarget {
        command: config.command.clone(),
        printer: config.printer.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_target_carries_command_and_printer() {
        let config = PrintConfig {
            printer: Some("Badge_Printer".to_string()),
            ..PrintConfig::default()
        };
        let target = print_target(&config);
        assert_eq!(target.command, "lp");
        assert_eq!(target.printer.as_deref(), Some("Badge_Printer"));
    }

    #[test]
    fn host_matches_build_target() {
        let host = host_services(&PrintConfig::default());
        let expected = if cfg!(target_os = "windows") {
            "windows"
        } else if cfg!(target_os = "macos") {
            "macos"
        } else {
            "linux"
        };
        assert_eq!(host.name(), expected);
    }
}
