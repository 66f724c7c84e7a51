//! TrueType faces used to measure and embed badge text.
//!
//! A badge is set in a [`FontStack`]: a primary face followed by fallbacks.
//! Every character is drawn with the first face whose character map covers
//! it, so a Latin primary plus a CJK fallback prints both scripts. Widths
//! come from the faces' own advance tables, which keeps auto-fit in step
//! with what the printer draws.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use checkin_common::error::{CheckinError, CheckinResult};
use ttf_parser::{name_id, Face, GlyphId};

/// DejaVu Sans Bold, shipped with the station so badges render without any
/// system fonts installed.
pub const BUNDLED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// One character mapped to a glyph of a particular face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub gid: u16,
    /// Horizontal advance in font units.
    pub advance: u16,
}

/// Consecutive glyphs drawn with the same face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRun {
    /// Index into the [`FontStack`].
    pub font: usize,
    pub glyphs: Vec<Glyph>,
}

/// Face-wide metrics in font units, as the PDF font descriptor needs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceMetrics {
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
    pub cap_height: i16,
    /// `[x_min, y_min, x_max, y_max]`
    pub bbox: [i16; 4],
}

/// A parsed TrueType face with its character map resolved up front.
#[derive(Clone)]
pub struct BadgeFont {
    name: String,
    data: Arc<[u8]>,
    glyphs: HashMap<char, (u16, u16)>,
    notdef_advance: u16,
    metrics: FaceMetrics,
}

impl fmt::Debug for BadgeFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BadgeFont")
            .field("name", &self.name)
            .field("bytes", &self.data.len())
            .field("chars", &self.glyphs.len())
            .finish()
    }
}

impl BadgeFont {
    pub fn bundled() -> CheckinResult<Self> {
        Self::from_bytes(BUNDLED_FONT.to_vec())
    }

    pub fn from_file(path: &Path) -> CheckinResult<Self> {
        if !path.exists() {
            return Err(CheckinError::file_not_found(path));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(data).map_err(|e| {
            CheckinError::render(format!("Font {}: {e}", path.display()))
        })
    }

    /// Parse a TrueType (glyf-outline) face. CFF-flavoured OpenType fonts and
    /// font collections are rejected because they cannot be embedded as
    /// `FontFile2`.
    pub fn from_bytes(data: Vec<u8>) -> CheckinResult<Self> {
        if data.starts_with(b"ttcf") {
            return Err(CheckinError::render(
                "Font collections are not supported; extract one face to a .ttf",
            ));
        }
        let (name, glyphs, notdef_advance, metrics) = {
            let face = Face::parse(&data, 0)
                .map_err(|e| CheckinError::render(format!("Unreadable font: {e}")))?;
            if face.tables().glyf.is_none() {
                return Err(CheckinError::render(
                    "Only TrueType outline fonts can be embedded",
                ));
            }

            let mut glyphs = HashMap::new();
            if let Some(cmap) = face.tables().cmap {
                for subtable in cmap.subtables {
                    if !subtable.is_unicode() {
                        continue;
                    }
                    subtable.codepoints(|cp| {
                        let Some(ch) = char::from_u32(cp) else {
                            return;
                        };
                        if let Some(gid) = subtable.glyph_index(cp).filter(|g| g.0 != 0) {
                            let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                            glyphs.entry(ch).or_insert((gid.0, advance));
                        }
                    });
                }
            }

            let bbox = face.global_bounding_box();
            let metrics = FaceMetrics {
                units_per_em: face.units_per_em(),
                ascent: face.ascender(),
                descent: face.descender(),
                cap_height: face.capital_height().unwrap_or_else(|| face.ascender()),
                bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            };
            let notdef_advance = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
            (postscript_name(&face), glyphs, notdef_advance, metrics)
        };

        if metrics.units_per_em == 0 {
            return Err(CheckinError::render("Font reports zero units per em"));
        }

        Ok(Self {
            name,
            data: data.into(),
            glyphs,
            notdef_advance,
            metrics,
        })
    }

    /// PostScript name, safe to use as a PDF name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    pub fn units_per_em(&self) -> u16 {
        self.metrics.units_per_em
    }

    pub fn glyph(&self, ch: char) -> Option<Glyph> {
        self.glyphs
            .get(&ch)
            .map(|&(gid, advance)| Glyph { ch, gid, advance })
    }

    pub fn notdef_advance(&self) -> u16 {
        self.notdef_advance
    }

    /// The missing-glyph box this face draws for `ch`.
    pub fn notdef(&self, ch: char) -> Glyph {
        Glyph {
            ch,
            gid: 0,
            advance: self.notdef_advance,
        }
    }

    /// Convert font units to thousandths of an em, the PDF glyph space.
    pub fn to_pdf_units(&self, units: i32) -> i64 {
        (f64::from(units) * 1000.0 / f64::from(self.metrics.units_per_em)).round() as i64
    }
}

fn postscript_name(face: &Face<'_>) -> String {
    let name = face
        .names()
        .into_iter()
        .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|n| n.to_string())
        .unwrap_or_default();
    let clean: String = name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();
    if clean.is_empty() {
        "BadgeFont".to_string()
    } else {
        clean
    }
}

/// Primary face plus fallbacks, in lookup order.
#[derive(Debug, Clone)]
pub struct FontStack {
    fonts: Vec<BadgeFont>,
}

impl FontStack {
    pub fn new(fonts: Vec<BadgeFont>) -> CheckinResult<Self> {
        if fonts.is_empty() {
            return Err(CheckinError::config("Font stack needs at least one font"));
        }
        Ok(Self { fonts })
    }

    /// The bundled face alone.
    pub fn bundled() -> CheckinResult<Self> {
        Self::new(vec![BadgeFont::bundled()?])
    }

    /// Load the configured stack. Without a primary override the bundled
    /// face leads; fallbacks follow in the order given.
    pub fn load(primary: Option<&Path>, fallbacks: &[PathBuf]) -> CheckinResult<Self> {
        let mut fonts = Vec::with_capacity(fallbacks.len() + 1);
        fonts.push(match primary {
            Some(path) => BadgeFont::from_file(path)?,
            None => BadgeFont::bundled()?,
        });
        for path in fallbacks {
            fonts.push(BadgeFont::from_file(path)?);
        }

        for font in &fonts {
            tracing::debug!(
                font = font.name(),
                chars = font.glyphs.len(),
                "Badge font loaded"
            );
        }
        Self::new(fonts)
    }

    pub fn fonts(&self) -> &[BadgeFont] {
        &self.fonts
    }

    pub fn get(&self, index: usize) -> Option<&BadgeFont> {
        self.fonts.get(index)
    }

    /// Map `text` onto glyph runs. Characters no face covers fall back to
    /// the primary face's missing-glyph box.
    pub fn shape(&self, text: &str) -> Vec<GlyphRun> {
        group_runs(text.chars().map(|ch| self.resolve(ch)))
    }

    fn resolve(&self, ch: char) -> (usize, Glyph) {
        self.fonts
            .iter()
            .enumerate()
            .find_map(|(i, font)| font.glyph(ch).map(|g| (i, g)))
            .unwrap_or_else(|| (0, self.fonts[0].notdef(ch)))
    }

    /// Characters of `text` that no face in the stack covers.
    pub fn missing_chars(&self, text: &str) -> Vec<char> {
        let mut missing = Vec::new();
        for ch in text.chars() {
            if ch.is_control() || missing.contains(&ch) {
                continue;
            }
            if self.fonts.iter().all(|f| f.glyph(ch).is_none()) {
                missing.push(ch);
            }
        }
        missing
    }

    /// Width of one run at `size` points.
    pub fn run_width(&self, run: &GlyphRun, size: f32) -> f32 {
        let Some(font) = self.fonts.get(run.font) else {
            return 0.0;
        };
        let units: u32 = run.glyphs.iter().map(|g| u32::from(g.advance)).sum();
        units as f32 * size / f32::from(font.units_per_em())
    }

    /// Width of shaped text at `size` points.
    pub fn runs_width(&self, runs: &[GlyphRun], size: f32) -> f32 {
        runs.iter().map(|r| self.run_width(r, size)).sum()
    }

    /// Width of `text` at `size` points.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        self.runs_width(&self.shape(text), size)
    }
}

/// Merge per-character font choices into runs.
pub fn group_runs(glyphs: impl IntoIterator<Item = (usize, Glyph)>) -> Vec<GlyphRun> {
    let mut runs: Vec<GlyphRun> = Vec::new();
    for (font, glyph) in glyphs {
        match runs.last_mut() {
            Some(run) if run.font == font => run.glyphs.push(glyph),
            _ => runs.push(GlyphRun {
                font,
                glyphs: vec![glyph],
            }),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char, gid: u16) -> Glyph {
        Glyph {
            ch,
            gid,
            advance: 500,
        }
    }

    #[test]
    fn bundled_face_covers_latin_and_cyrillic() {
        let font = BadgeFont::bundled().unwrap();
        assert_eq!(font.units_per_em(), 2048);
        assert_eq!(font.name(), "DejaVuSans-Bold");
        for ch in "AnnaLEEÖëЖанна-'".chars() {
            let g = font.glyph(ch).unwrap();
            assert_ne!(g.gid, 0, "{ch}");
            assert!(g.advance > 0, "{ch}");
        }
        assert!(font.glyph('明').is_none());
    }

    #[test]
    fn width_scales_with_size() {
        let fonts = FontStack::bundled().unwrap();
        let at_ten = fonts.text_width("LEE", 10.0);
        let at_twenty = fonts.text_width("LEE", 20.0);
        assert!(at_ten > 0.0);
        assert!((at_twenty - 2.0 * at_ten).abs() < 1e-3);
        // L, E, E at 2048 upem: 1305 + 1399 + 1399.
        assert!((fonts.text_width("LEE", 28.0) - 56.10).abs() < 0.05);
    }

    #[test]
    fn uncovered_chars_are_reported_and_drawn_as_notdef() {
        let fonts = FontStack::bundled().unwrap();
        assert_eq!(fonts.missing_chars("Li 明明 Wei"), vec!['明']);
        assert!(fonts.missing_chars("Жанна").is_empty());

        let runs = fonts.shape("明");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font, 0);
        assert_eq!(runs[0].glyphs[0].gid, 0);
        assert!(fonts.text_width("明", 10.0) > 0.0);
    }

    #[test]
    fn consecutive_chars_from_one_face_share_a_run() {
        let runs = group_runs([
            (0, glyph('A', 1)),
            (0, glyph('b', 2)),
            (1, glyph('明', 7)),
            (1, glyph('月', 8)),
            (0, glyph('c', 3)),
        ]);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].font, 0);
        assert_eq!(runs[0].glyphs.len(), 2);
        assert_eq!(runs[1].font, 1);
        assert_eq!(runs[1].glyphs.iter().map(|g| g.ch).collect::<String>(), "明月");
        assert_eq!(runs[2].glyphs[0].ch, 'c');
        assert!(group_runs([]).is_empty());
    }

    #[test]
    fn fallback_face_is_used_only_for_uncovered_chars() {
        let primary = BadgeFont::bundled().unwrap();
        let fallback = BadgeFont::bundled().unwrap();
        let fonts = FontStack::new(vec![primary, fallback]).unwrap();
        // Both faces cover Latin, so the primary wins every character.
        let runs = fonts.shape("Anna");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font, 0);
    }

    #[test]
    fn missing_or_invalid_font_files_are_errors() {
        let err = BadgeFont::from_file(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, CheckinError::FileNotFound { .. }));

        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        let err = BadgeFont::from_file(&bogus).unwrap_err();
        assert!(matches!(err, CheckinError::Render { .. }));

        assert!(FontStack::new(Vec::new()).is_err());
    }

    #[test]
    fn configured_primary_replaces_bundled_face() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.ttf");
        std::fs::write(&path, BUNDLED_FONT).unwrap();

        let fonts = FontStack::load(Some(&path), &[path.clone()]).unwrap();
        assert_eq!(fonts.fonts().len(), 2);
        assert_eq!(fonts.get(0).unwrap().data().len(), BUNDLED_FONT.len());
    }
}
