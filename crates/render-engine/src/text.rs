//! Name normalization and auto-fit.

use crate::font::FontStack;

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
///
/// `"jean-luc"` becomes `"Jean-Luc"`, `"o'neil"` becomes `"O'Neil"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.trim().chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Trimmed, upper-cased last name.
pub fn upper_case(text: &str) -> String {
    text.trim().to_uppercase()
}

/// Largest size, stepping down 1 pt from `max_pt`, at which `text` fits in
/// `max_width` points when set in `fonts`. Never returns less than `min_pt`.
pub fn fit_font_size(
    fonts: &FontStack,
    text: &str,
    max_pt: f32,
    min_pt: f32,
    max_width: f32,
) -> f32 {
    let runs = fonts.shape(text);
    let mut size = max_pt;
    while size > min_pt && fonts.runs_width(&runs, size) > max_width {
        size -= 1.0;
    }
    size.max(min_pt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn title_case_examples() {
        assert_eq!(title_case("anna"), "Anna");
        assert_eq!(title_case("  ANNA "), "Anna");
        assert_eq!(title_case("jean-luc"), "Jean-Luc");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("mary ann"), "Mary Ann");
        assert_eq!(title_case("zoë"), "Zoë");
    }

    #[test]
    fn upper_case_examples() {
        assert_eq!(upper_case("Lee"), "LEE");
        assert_eq!(upper_case(" Brontë-Smith"), "BRONTË-SMITH");
    }

    #[test]
    fn short_text_keeps_maximum_size() {
        let fonts = FontStack::bundled().unwrap();
        assert_eq!(fit_font_size(&fonts, "LEE", 28.0, 10.0, 223.0), 28.0);
    }

    #[test]
    fn long_text_shrinks_to_fit() {
        let fonts = FontStack::bundled().unwrap();
        let text = "WOLFESCHLEGELSTEINHAUSENBERGER";
        let size = fit_font_size(&fonts, text, 28.0, 10.0, 223.0);
        assert!(size < 28.0);
        assert!(fonts.text_width(text, size) <= 223.0);
        assert!(fonts.text_width(text, size + 1.0) > 223.0);
    }

    #[test]
    fn non_latin_names_are_measured_too() {
        let fonts = FontStack::bundled().unwrap();
        let text = "ЖАННА-ЖАННА-ЖАННА-ЖАННА";
        let size = fit_font_size(&fonts, text, 28.0, 10.0, 223.0);
        assert!(size < 28.0);
        assert!(fonts.text_width(text, size) <= 223.0);
    }

    #[test]
    fn floor_wins_over_fit() {
        let fonts = FontStack::bundled().unwrap();
        let text = "X".repeat(200);
        assert_eq!(fit_font_size(&fonts, &text, 28.0, 10.0, 223.0), 10.0);
    }

    proptest! {
        #[test]
        fn fitted_size_is_largest_fitting_step(
            text in "[A-Za-z '\\-]{0,60}",
            max in 12u8..48,
            min in 4u8..12,
            width in 50.0f32..400.0,
        ) {
            let fonts = FontStack::bundled().unwrap();
            let (max, min) = (max as f32, min as f32);
            let size = fit_font_size(&fonts, &text, max, min, width);

            prop_assert!(size >= min && size <= max);
            if size > min {
                prop_assert!(fonts.text_width(&text, size) <= width);
            }
            if size < max && size > min {
                prop_assert!(fonts.text_width(&text, size + 1.0) > width);
            }
        }
    }
}
