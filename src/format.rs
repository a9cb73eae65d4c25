//! Display formatting for decoded metadata values.
//!
//! Pure string rendering: the decoder hands over raw strings and rationals,
//! these functions turn them into what the UI shows. Absent values render as
//! the shared [`UNKNOWN`] sentinel rather than erroring.

use chrono::{NaiveDate, NaiveDateTime};

use crate::exif::Rational;

/// Fallback shown for any field the image did not carry.
pub const UNKNOWN: &str = "unknown";

/// The given value, or the [`UNKNOWN`] sentinel when absent.
pub fn or_unknown(value: Option<&str>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// Render a raw EXIF timestamp (`"YYYY:MM:DD HH:MM:SS"`) as a human string,
/// e.g. `"17 May 2023 14:30:00"`.
///
/// Absent or empty input yields [`UNKNOWN`]; a non-empty value that does not
/// parse is shown verbatim rather than dropped.
pub fn timestamp(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s.trim(),
        _ => return UNKNOWN.to_string(),
    };

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y:%m:%d %H:%M:%S") {
        return dt.format("%-d %B %Y %H:%M:%S").to_string();
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y:%m:%d") {
        return d.format("%-d %B %Y").to_string();
    }
    raw.to_string()
}

/// Render an aperture ratio as `f/2.8`.
pub fn f_number(value: Rational) -> String {
    format!("f/{:.1}", value.to_f64())
}

/// Render a focal length as `50.0mm`.
pub fn focal_length(value: Rational) -> String {
    format!("{:.1}mm", value.to_f64())
}

/// Render an exposure time as the shutter speed photographers read:
/// `1/200` for exposures under a second, `2.0s` for longer ones.
///
/// The inversion is computed from the whole rational (`denom/num`), so a
/// numerator other than 1 still renders correctly — `2/500` becomes `1/250`.
pub fn exposure_time(value: Rational) -> String {
    if value.num == 0 {
        return "0s".to_string();
    }
    let seconds = value.to_f64();
    if seconds >= 1.0 {
        format!("{seconds:.1}s")
    } else {
        format!("1/{:.0}", 1.0 / seconds)
    }
}

/// Render a coordinate pair as `"39.906217°, 116.391276°"`.
pub fn coordinates(latitude: f64, longitude: f64, precision: usize) -> String {
    format!("{latitude:.precision$}°, {longitude:.precision$}°")
}
