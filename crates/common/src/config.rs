//! Application configuration.
//!
//! Every component receives the piece of [`AppConfig`] it needs. Nothing is
//! read from module-level constants at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CheckinError, CheckinResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Roster source and column mapping.
    pub roster: RosterConfig,

    /// Badge category, template and output locations.
    pub badge: BadgeConfig,

    /// Camera scanning parameters.
    pub scanner: ScannerConfig,

    /// Print dispatch settings.
    pub printing: PrintConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Where the attendee roster lives and how its columns are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// CSV export of the registration system.
    pub path: PathBuf,

    /// Column holding the order/ticket identifier.
    pub order_id_column: String,

    /// Column holding the attendee first name.
    pub first_name_column: String,

    /// Column holding the attendee last name.
    pub last_name_column: String,

    /// Column holding the ticket type. `None` disables category labels.
    pub ticket_type_column: Option<String>,

    /// Long ticket-type strings rewritten to short badge labels.
    pub label_map: BTreeMap<String, String>,
}

/// The fixed set of badge categories, one background template each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BadgeCategory {
    #[default]
    Attendee,
    Speaker,
    Sponsor,
    Volunteer,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 4] = [
        BadgeCategory::Attendee,
        BadgeCategory::Speaker,
        BadgeCategory::Sponsor,
        BadgeCategory::Volunteer,
    ];

    /// Canonical upper-case name, also used for template and directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeCategory::Attendee => "ATTENDEE",
            BadgeCategory::Speaker => "SPEAKER",
            BadgeCategory::Sponsor => "SPONSOR",
            BadgeCategory::Volunteer => "VOLUNTEER",
        }
    }
}

impl fmt::Display for BadgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeCategory {
    type Err = CheckinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                CheckinError::config(format!(
                    "Unknown badge category '{s}' (expected one of ATTENDEE, SPEAKER, SPONSOR, VOLUNTEER)"
                ))
            })
    }
}

/// Badge rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    /// Category being printed at this station.
    pub category: BadgeCategory,

    /// Directory holding `<CATEGORY>.png` background templates.
    pub template_dir: PathBuf,

    /// Root directory for generated badges; one subdirectory per category.
    pub output_dir: PathBuf,

    /// Physical page layout.
    pub layout: BadgeLayout,

    /// TrueType face replacing the bundled one for name text.
    pub font_path: Option<PathBuf>,

    /// Faces consulted, in order, for characters the primary face lacks.
    pub fallback_fonts: Vec<PathBuf>,
}

/// Physical badge layout. Lengths are millimetres, font sizes are points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BadgeLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,

    /// Distance from the page top to the first name baseline.
    pub name_baseline_mm: f32,

    /// Largest font size tried for name lines.
    pub name_max_font_pt: f32,

    /// Largest font size tried for the category label.
    pub label_max_font_pt: f32,

    /// Auto-fit floor.
    pub min_font_pt: f32,

    /// Share of the page width a text line may occupy.
    pub fit_fraction: f32,

    /// Baseline-to-baseline distance as a multiple of the line's font size.
    pub line_spacing: f32,

    /// Distance from the page top to the top edge of the QR code.
    pub qr_top_mm: f32,

    /// Edge length of the printed QR code, quiet zone included.
    pub qr_size_mm: f32,
}

/// Camera scanning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Zero-based camera index.
    pub camera_index: u32,

    /// Minimum time between two frame pulls.
    pub scan_interval_ms: u64,

    /// Resolution used when rasterizing ticket PDFs.
    pub raster_dpi: u32,
}

/// Print dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Send rendered badges to the printer.
    pub enabled: bool,

    /// Print command on Unix-like hosts.
    pub command: String,

    /// Named printer; `None` uses the system default.
    pub printer: Option<String>,

    /// Optional sound file played on alerts.
    pub alert_sound: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "checkin=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster: RosterConfig::default(),
            badge: BadgeConfig::default(),
            scanner: ScannerConfig::default(),
            printing: PrintConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("attendees.csv"),
            order_id_column: "Order ID".to_string(),
            first_name_column: "Attendee first name".to_string(),
            last_name_column: "Attendee last name".to_string(),
            ticket_type_column: Some("Ticket type".to_string()),
            label_map: default_label_map(),
        }
    }
}

/// Ticket names as exported by the registration platform, mapped to the
/// labels that fit on a badge.
fn default_label_map() -> BTreeMap<String, String> {
    [
        ("General Admission", "ATTENDEE"),
        ("Early Bird General Admission", "ATTENDEE"),
        ("Student General Admission", "STUDENT"),
        ("Speaker Pass (Complimentary)", "SPEAKER"),
        ("Sponsor & Partner Pass", "SPONSOR"),
        ("Volunteer Pass (Staff Only)", "VOLUNTEER"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            category: BadgeCategory::default(),
            template_dir: PathBuf::from("badge_template/PNG"),
            output_dir: PathBuf::from("generated_badges"),
            layout: BadgeLayout::default(),
            font_path: None,
            fallback_fonts: Vec::new(),
        }
    }
}

impl BadgeConfig {
    /// Background template for the configured category.
    pub fn template_path(&self) -> PathBuf {
        self.template_dir
            .join(format!("{}.png", self.category.as_str()))
    }

    /// Output directory for the configured category.
    pub fn category_output_dir(&self) -> PathBuf {
        self.output_dir.join(self.category.as_str())
    }
}

impl Default for BadgeLayout {
    fn default() -> Self {
        // A6 portrait.
        Self {
            page_width_mm: 105.0,
            page_height_mm: 148.0,
            name_baseline_mm: 70.0,
            name_max_font_pt: 28.0,
            label_max_font_pt: 16.0,
            min_font_pt: 10.0,
            fit_fraction: 0.75,
            line_spacing: 1.2,
            qr_top_mm: 96.0,
            qr_size_mm: 35.0,
        }
    }
}

impl BadgeLayout {
    /// Reject layouts that cannot produce a readable page.
    pub fn validate(&self) -> CheckinResult<()> {
        if self.page_width_mm <= 0.0 || self.page_height_mm <= 0.0 {
            return Err(CheckinError::config("Badge page size must be positive"));
        }
        if self.min_font_pt <= 0.0 || self.min_font_pt > self.name_max_font_pt {
            return Err(CheckinError::config(format!(
                "Font floor {} pt must be positive and not exceed the name size {} pt",
                self.min_font_pt, self.name_max_font_pt
            )));
        }
        if !(0.0..=1.0).contains(&self.fit_fraction) || self.fit_fraction == 0.0 {
            return Err(CheckinError::config(format!(
                "fit_fraction must be in (0, 1], got {}",
                self.fit_fraction
            )));
        }
        if self.qr_size_mm <= 0.0 || self.qr_top_mm + self.qr_size_mm > self.page_height_mm {
            return Err(CheckinError::config("QR code does not fit on the page"));
        }
        Ok(())
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            scan_interval_ms: 100,
            raster_dpi: 200,
        }
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "lp".to_string(),
            printer: None,
            alert_sound: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path. Missing keys take defaults.
    pub fn load_from(path: &Path) -> CheckinResult<Self> {
        if !path.exists() {
            return Err(CheckinError::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("checkin").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "speaker".parse::<BadgeCategory>().unwrap(),
            BadgeCategory::Speaker
        );
        assert!("keynote".parse::<BadgeCategory>().is_err());
    }

    #[test]
    fn category_selects_template_and_output_dir() {
        let badge = BadgeConfig {
            category: BadgeCategory::Speaker,
            template_dir: PathBuf::from("tpl"),
            output_dir: PathBuf::from("out"),
            ..BadgeConfig::default()
        };
        assert_eq!(badge.template_path(), PathBuf::from("tpl/SPEAKER.png"));
        assert_eq!(badge.category_output_dir(), PathBuf::from("out/SPEAKER"));
    }

    #[test]
    fn partial_config_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "badge": { "category": "VOLUNTEER" }, "scanner": { "camera_index": 2 } }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.badge.category, BadgeCategory::Volunteer);
        assert_eq!(config.scanner.camera_index, 2);
        assert_eq!(config.scanner.scan_interval_ms, 100);
        assert_eq!(config.roster.order_id_column, "Order ID");
        assert_eq!(config.badge.layout, BadgeLayout::default());
        assert!(config.badge.font_path.is_none());
        assert!(config.badge.fallback_fonts.is_empty());
    }

    #[test]
    fn fallback_fonts_are_read_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "badge": { "fallback_fonts": ["fonts/NotoSansCJK.ttf", "fonts/Arabic.ttf"] } }"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(
            config.badge.fallback_fonts,
            vec![
                PathBuf::from("fonts/NotoSansCJK.ttf"),
                PathBuf::from("fonts/Arabic.ttf")
            ]
        );
    }

    #[test]
    fn missing_config_file_is_reported() {
        let err = AppConfig::load_from(Path::new("/nonexistent/checkin.json")).unwrap_err();
        assert!(matches!(err, CheckinError::FileNotFound { .. }));
    }

    #[test]
    fn save_then_load_preserves_printer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.printing.printer = Some("Zebra_ZD421".to_string());
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.printing.printer.as_deref(), Some("Zebra_ZD421"));
    }

    #[test]
    fn default_layout_is_valid() {
        BadgeLayout::default().validate().unwrap();
    }

    #[test]
    fn layout_rejects_qr_past_page_bottom() {
        let layout = BadgeLayout {
            qr_top_mm: 140.0,
            ..BadgeLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
