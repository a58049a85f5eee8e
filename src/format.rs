//! Field Formatting - Total Functions Over Untrusted Record Text
//!
//! Nothing here fails. Malformed input degrades to a literal fallback.

use serde::{Deserialize, Serialize};

/// Long-form institution name that the front header replaces.
pub const KNOWN_LONG_NAME: &str = "Universitas Negeri Yogyakarta";
pub const KNOWN_SHORT_NAME: &str = "YOGYAKARTA STATE UNIVERSITY";

pub const BARCODE_PLACEHOLDER: &str = "000000000000";
pub const QR_FALLBACK_PREFIX: &str = "KTM";
pub const ELLIPSIS: char = '…';

/// Average glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.55;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Id,
    En,
}

const MONTHS_ID: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni",
    "Juli", "Agustus", "September", "Oktober", "November", "Desember",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

impl Locale {
    /// Month name for a two-digit code `"01".."12"`.
    pub fn month_name(self, code: &str) -> Option<&'static str> {
        let table = match self {
            Locale::Id => &MONTHS_ID,
            Locale::En => &MONTHS_EN,
        };
        if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n: usize = code.parse().ok()?;
        (1..=12).contains(&n).then(|| table[n - 1])
    }
}

/// `"{place}, {day} {month} {year}"`, or `"{place}, {date}"` when the date
/// does not split into exactly three `/` parts.
pub fn format_birth_info(place: &str, date: &str, locale: Locale) -> String {
    let parts: Vec<&str> = date.split('/').collect();
    let &[day, month, year] = parts.as_slice() else {
        tracing::debug!(date, "birth date not in D/M/Y form, rendering raw");
        return format!("{}, {}", place, date);
    };

    let month: &str = locale.month_name(month).unwrap_or(month);
    let day = match day.trim().parse::<u32>() {
        Ok(n) => n.to_string(),
        Err(_) => day.to_string(),
    };

    format!("{}, {} {} {}", place, day, month, year)
}

pub fn normalize_university_name(name: &str) -> &str {
    if name == KNOWN_LONG_NAME {
        KNOWN_SHORT_NAME
    } else {
        name
    }
}

/// Digits of `source` in order, or the twelve-zero placeholder.
pub fn barcode_value(source: &str) -> String {
    let digits: String = source.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        BARCODE_PLACEHOLDER.to_string()
    } else {
        digits
    }
}

/// The card number, or `KTM-{nim}-{year}` when there is none.
pub fn qr_payload(card_number: &str, student_number: &str, year: i32) -> String {
    if card_number.is_empty() {
        format!("{}-{}-{}", QR_FALLBACK_PREFIX, student_number, year)
    } else {
        card_number.to_string()
    }
}

/// How many glyphs of `font_size` fit in `width_px`.
pub fn glyph_capacity(width_px: f32, font_size: f32) -> usize {
    if width_px <= 0.0 || font_size <= 0.0 {
        return 0;
    }
    (width_px / (font_size * AVG_GLYPH_EM)).floor() as usize
}

/// Cut `text` to fit its region, marking the cut with an ellipsis.
///
/// Returns the displayed text and whether it was truncated.
pub fn truncate_to_width(text: &str, width_px: f32, font_size: f32) -> (String, bool) {
    let capacity = glyph_capacity(width_px, font_size);
    if text.chars().count() <= capacity {
        return (text.to_string(), false);
    }
    if capacity == 0 {
        return (String::new(), true);
    }
    let mut out: String = text.chars().take(capacity - 1).collect();
    out.truncate(out.trim_end().len());
    out.push(ELLIPSIS);
    (out, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birth_info_indonesian() {
        assert_eq!(
            format_birth_info("Temanggung", "10/11/2005", Locale::Id),
            "Temanggung, 10 November 2005"
        );
        assert_eq!(
            format_birth_info("Sleman", "03/08/2004", Locale::Id),
            "Sleman, 3 Agustus 2004"
        );
    }

    #[test]
    fn test_birth_info_english() {
        assert_eq!(
            format_birth_info("Jakarta", "10/11/2005", Locale::En),
            "Jakarta, 10 November 2005"
        );
        assert_eq!(
            format_birth_info("Jakarta", "01/05/1999", Locale::En),
            "Jakarta, 1 May 1999"
        );
    }

    #[test]
    fn test_birth_info_fallbacks() {
        assert_eq!(format_birth_info("Jakarta", "not-a-date", Locale::Id), "Jakarta, not-a-date");
        assert_eq!(format_birth_info("Jakarta", "1/2/3/4", Locale::Id), "Jakarta, 1/2/3/4");
        assert_eq!(format_birth_info("Jakarta", "", Locale::Id), "Jakarta, ");
    }

    #[test]
    fn test_unknown_month_kept_raw() {
        assert_eq!(format_birth_info("Solo", "05/13/2001", Locale::Id), "Solo, 5 13 2001");
        assert_eq!(format_birth_info("Solo", "05/1/2001", Locale::Id), "Solo, 5 1 2001");
    }

    #[test]
    fn test_non_numeric_day_kept_raw() {
        assert_eq!(format_birth_info("Solo", "xx/02/2001", Locale::Id), "Solo, xx Februari 2001");
    }

    #[test]
    fn test_name_normalization() {
        assert_eq!(normalize_university_name(KNOWN_LONG_NAME), KNOWN_SHORT_NAME);
        assert_eq!(normalize_university_name("Universitas Gadjah Mada"), "Universitas Gadjah Mada");
        assert_eq!(
            normalize_university_name("Universitas Negeri Yogyakarta Kampus Wates"),
            "Universitas Negeri Yogyakarta Kampus Wates"
        );
    }

    #[test]
    fn test_barcode_value() {
        assert_eq!(barcode_value(""), BARCODE_PLACEHOLDER);
        assert_eq!(barcode_value("KTM-AB"), BARCODE_PLACEHOLDER);
        assert_eq!(barcode_value("21/480915/PA/20822"), "2148091520822");
        assert_eq!(barcode_value("A1B2C3"), "123");
    }

    #[test]
    fn test_qr_payload() {
        assert_eq!(qr_payload("KTM2024001", "123", 2026), "KTM2024001");
        assert_eq!(qr_payload("", "123", 2026), "KTM-123-2026");
    }

    #[test]
    fn test_truncation() {
        let (short, cut) = truncate_to_width("Rina", 100.0, 11.0);
        assert_eq!(short, "Rina");
        assert!(!cut);

        // 60px at 10px font fits 10 glyphs
        let (long, cut) = truncate_to_width("Muhammad Rizky Pratama", 60.0, 10.0);
        assert!(cut);
        assert_eq!(long, "Muhammad…");
        assert!(long.chars().count() <= 10);

        let (none, cut) = truncate_to_width("abc", 0.0, 10.0);
        assert_eq!(none, "");
        assert!(cut);
    }
}
