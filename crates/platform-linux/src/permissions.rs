//! Permission and tool detection for Linux.

use checkin_platform_core::{command_exists, Capability, PrintTarget};

use crate::video_device_path;

/// Check all capabilities and report status.
pub fn check_capabilities(target: &PrintTarget) -> Vec<Capability> {
    vec![
        check_print_command(target),
        check_default_printer(target),
        check_camera_device(),
        check_rasterizer(),
    ]
}

fn check_print_command(target: &PrintTarget) -> Capability {
    Capability::new(
        "Print Command",
        format!("`{}` for sending badges to the printer", target.command),
        command_exists(&target.command),
        true,
        "Install CUPS client tools: sudo apt install cups-client",
    )
}

/// `lpstat -d` reports the system default destination.
fn check_default_printer(target: &PrintTarget) -> Capability {
    let available = target.printer.is_some()
        || std::process::Command::new("lpstat")
            .arg("-d")
            .output()
            .map(|o| {
                o.status.success()
                    && !String::from_utf8_lossy(&o.stdout).contains("no system default")
            })
            .unwrap_or(false);

    Capability::new(
        "Printer Destination",
        "A named printer or a CUPS system default",
        available,
        false,
        "Set a default with `lpoptions -d <printer>` or configure printing.printer",
    )
}

fn check_camera_device() -> Capability {
    let has_camera = (0..16)
        .map(video_device_path)
        .any(|path| std::path::Path::new(&path).exists());

    Capability::new(
        "Camera Device",
        "Video4Linux camera for live QR scanning",
        has_camera,
        false,
        "Connect a camera and verify /dev/video* exists (v4l2-ctl --list-devices)",
    )
}

fn check_rasterizer() -> Capability {
    Capability::new(
        "PDF Rasterizer",
        "`pdftoppm` for reading QR codes from ticket PDFs",
        command_exists("pdftoppm"),
        false,
        "Install poppler: sudo apt install poppler-utils",
    )
}
