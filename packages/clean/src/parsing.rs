//! Cell-level parsers for the raw accident files.
//!
//! Raw open-data exports carry dirty values, so none of these fail: a
//! malformed or missing cell becomes `None`. Category labels are resolved
//! through [`road_safety_config::CodeMapping`] and the lighting bucket
//! through [`road_safety_accident_models::LightingGroup::from_code`].

use chrono::NaiveDate;

/// Tokens meaning "no coordinate" in the raw exports.
const MISSING_COORDINATE_TOKENS: &[&str] = &["", "-1", "None", "nan"];

/// Parses a latitude or longitude. Accepts a comma decimal separator.
///
/// Returns `None` for a missing cell, an empty string, the `-1` sentinel,
/// non-numeric text and non-finite values.
#[must_use]
pub fn parse_coordinate(value: Option<&str>) -> Option<f64> {
    let text = value?.trim().replace(',', ".");
    if MISSING_COORDINATE_TOKENS.contains(&text.as_str()) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Extracts the hour (0-23) from an `HHMM` time string.
///
/// The string is left-padded to four characters after dropping any
/// fractional suffix (`"830.0"` reads as `"0830"`). The `HH:MM` form is
/// also accepted.
#[must_use]
pub fn parse_hour(value: Option<&str>) -> Option<u8> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    let digits = match text.split_once(':') {
        Some((hours, _)) if !hours.is_empty() => format!("{hours:0>2}"),
        Some(_) => return None,
        None => {
            let whole = text.split_once('.').map_or(text, |(whole, _)| whole);
            format!("{whole:0>4}")
        }
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour = digits.get(..2)?.parse::<u8>().ok()?;
    (hour < 24).then_some(hour)
}

/// Parses a numeric category code. Integral floats (`"2.0"`) are accepted.
#[must_use]
pub fn parse_code(value: Option<&str>) -> Option<i64> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(code) = text.parse::<i64>() {
        return Some(code);
    }

    let float = text.parse::<f64>().ok()?;
    #[allow(clippy::cast_precision_loss)]
    let in_range = float.is_finite()
        && float.fract() == 0.0
        && float >= i64::MIN as f64
        && float <= i64::MAX as f64;
    #[allow(clippy::cast_possible_truncation)]
    in_range.then_some(float as i64)
}

/// Builds a calendar date from separate year, month and day cells.
#[must_use]
pub fn parse_date(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> Option<NaiveDate> {
    let year = i32::try_from(parse_code(year)?).ok()?;
    let month = u32::try_from(parse_code(month)?).ok()?;
    let day = u32::try_from(parse_code(day)?).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
