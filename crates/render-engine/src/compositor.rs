//! Badge composition: where every element of a page goes.
//!
//! Coordinates are PDF user space: points, origin at the bottom-left of the
//! page. Layout lengths from the configuration are millimetres measured from
//! the page top and are converted here.

use checkin_common::config::BadgeLayout;
use checkin_roster::Attendee;

use crate::font::{FontStack, GlyphRun};
use crate::text::{fit_font_size, title_case, upper_case};

/// Points per millimetre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_MM
}

/// Which field a text line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    FirstName,
    LastName,
    Category,
}

/// One centred, auto-fit text line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub role: LineRole,
    pub text: String,
    /// `text` mapped onto the font stack.
    pub runs: Vec<GlyphRun>,
    pub font_size: f32,
    /// Left edge of the text.
    pub x: f32,
    /// Baseline height above the page bottom.
    pub baseline: f32,
    /// Rendered width at `font_size`.
    pub width: f32,
}

/// QR code square.
#[derive(Debug, Clone, PartialEq)]
pub struct QrPlacement {
    pub payload: String,
    /// Bottom-left corner.
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Everything needed to draw one badge page.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeComposition {
    pub page_width: f32,
    pub page_height: f32,
    pub lines: Vec<TextLine>,
    pub qr: QrPlacement,
}

impl BadgeComposition {
    /// Widest text allowed by the auto-fit policy.
    pub fn max_text_width(layout: &BadgeLayout) -> f32 {
        mm_to_pt(layout.page_width_mm) * layout.fit_fraction
    }
}

/// Lay out the badge for one attendee.
///
/// Lines are stacked downward from the first-name baseline. Each line's
/// spacing follows its own fitted size, so a shrunken long name does not
/// leave a gap under it. Empty fields produce no line.
pub fn compose_badge(
    attendee: &Attendee,
    layout: &BadgeLayout,
    fonts: &FontStack,
) -> BadgeComposition {
    let page_width = mm_to_pt(layout.page_width_mm);
    let page_height = mm_to_pt(layout.page_height_mm);
    let max_width = BadgeComposition::max_text_width(layout);

    let mut fields = vec![
        (
            LineRole::FirstName,
            title_case(&attendee.first_name),
            layout.name_max_font_pt,
        ),
        (
            LineRole::LastName,
            upper_case(&attendee.last_name),
            layout.name_max_font_pt,
        ),
    ];
    if let Some(category) = attendee.category.as_deref() {
        fields.push((
            LineRole::Category,
            category.trim().to_string(),
            layout.label_max_font_pt,
        ));
    }

    let mut lines = Vec::with_capacity(fields.len());
    let mut offset_from_top = mm_to_pt(layout.name_baseline_mm);
    for (role, text, max_pt) in fields {
        if text.is_empty() {
            continue;
        }
        let font_size = fit_font_size(fonts, &text, max_pt, layout.min_font_pt, max_width);
        if !lines.is_empty() {
            offset_from_top += font_size * layout.line_spacing;
        }
        let runs = fonts.shape(&text);
        let width = fonts.runs_width(&runs, font_size);
        lines.push(TextLine {
            role,
            text,
            runs,
            font_size,
            x: (page_width - width) / 2.0,
            baseline: page_height - offset_from_top,
            width,
        });
    }

    let qr_size = mm_to_pt(layout.qr_size_mm);
    let qr = QrPlacement {
        payload: attendee.id.as_str().to_string(),
        x: (page_width - qr_size) / 2.0,
        y: page_height - mm_to_pt(layout.qr_top_mm) - qr_size,
        size: qr_size,
    };

    BadgeComposition {
        page_width,
        page_height,
        lines,
        qr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_roster::Identifier;

    fn compose(attendee: &Attendee, layout: &BadgeLayout) -> BadgeComposition {
        compose_badge(attendee, layout, &FontStack::bundled().unwrap())
    }

    fn attendee(first: &str, last: &str, category: Option<&str>) -> Attendee {
        Attendee {
            row: 2,
            order_id: "12345678901".to_string(),
            id: Identifier::new("12345678901"),
            first_name: first.to_string(),
            last_name: last.to_string(),
            ticket_type: category.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn names_are_normalized_and_centered() {
        let layout = BadgeLayout::default();
        let comp = compose(&attendee("anna", "Lee", Some("ATTENDEE")), &layout);

        let texts: Vec<_> = comp.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Anna", "LEE", "ATTENDEE"]);
        for line in &comp.lines {
            let center = line.x + line.width / 2.0;
            assert!((center - comp.page_width / 2.0).abs() < 0.01);
        }
    }

    #[test]
    fn lines_stack_downward() {
        let comp = compose(
            &attendee("anna", "Lee", Some("SPEAKER")),
            &BadgeLayout::default(),
        );
        let baselines: Vec<f32> = comp.lines.iter().map(|l| l.baseline).collect();
        assert!(baselines.windows(2).all(|w| w[0] > w[1]));
        let first_expected = comp.page_height - mm_to_pt(70.0);
        assert!((baselines[0] - first_expected).abs() < 0.01);
    }

    #[test]
    fn each_line_fits_independently() {
        let layout = BadgeLayout::default();
        let comp = compose(
            &attendee("Al", "Wolfeschlegelsteinhausenberger", None),
            &layout,
        );
        let max_width = BadgeComposition::max_text_width(&layout);
        assert_eq!(comp.lines[0].font_size, layout.name_max_font_pt);
        assert!(comp.lines[1].font_size < layout.name_max_font_pt);
        assert!(comp.lines[1].width <= max_width);
    }

    #[test]
    fn cyrillic_names_get_real_glyphs() {
        let comp = compose(&attendee("жанна", "Иванова", None), &BadgeLayout::default());
        assert_eq!(comp.lines[0].text, "Жанна");
        assert_eq!(comp.lines[1].text, "ИВАНОВА");
        for line in &comp.lines {
            assert!(line.runs.iter().flat_map(|r| &r.glyphs).all(|g| g.gid != 0));
            let center = line.x + line.width / 2.0;
            assert!((center - comp.page_width / 2.0).abs() < 0.01);
        }
    }

    #[test]
    fn empty_fields_are_skipped() {
        let comp = compose(&attendee("", "Prince", None), &BadgeLayout::default());
        assert_eq!(comp.lines.len(), 1);
        assert_eq!(comp.lines[0].role, LineRole::LastName);
    }

    #[test]
    fn qr_is_centered_at_fixed_offset() {
        let layout = BadgeLayout::default();
        let comp = compose(&attendee("anna", "Lee", None), &layout);
        assert_eq!(comp.qr.payload, "12345678901");
        assert!((comp.qr.x + comp.qr.size / 2.0 - comp.page_width / 2.0).abs() < 0.01);
        let top_gap = comp.page_height - (comp.qr.y + comp.qr.size);
        assert!((top_gap - mm_to_pt(layout.qr_top_mm)).abs() < 0.01);
        assert!((comp.qr.size - mm_to_pt(layout.qr_size_mm)).abs() < 0.01);
    }

    #[test]
    fn page_size_is_physical() {
        let comp = compose(&attendee("a", "b", None), &BadgeLayout::default());
        // A6 portrait.
        assert!((comp.page_width - 297.64).abs() < 0.01);
        assert!((comp.page_height - 419.53).abs() < 0.01);
    }
}
