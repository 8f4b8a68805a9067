/*!
 * Time codec for subtitle formats.
 *
 * The canonical in-memory time is `f64` seconds. ASS files store times as
 * `H:MM:SS.CC` (unpadded hours, centiseconds). JSON files store plain seconds
 * and need no codec beyond numeric parsing.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{Result, SubtitleError};

// @const: ASS timestamp regex, anchored so trailing garbage is never truncated away
static ASS_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").unwrap()
});

/// Guard added before truncating to centiseconds so that values such as
/// `0.29 * 100.0 == 28.999999999999996` land on the intended centisecond
const CENTISECOND_EPSILON: f64 = 1e-6;

/// Parse an ASS time string (`H:MM:SS.CC`) into seconds.
///
/// Surrounding whitespace is ignored. Minutes and seconds must be below 60.
pub fn parse_ass_time(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let invalid = || SubtitleError::InvalidTimestamp {
        value: text.to_string(),
    };

    let caps = ASS_TIME_REGEX.captures(trimmed).ok_or_else(invalid)?;

    let hours: u64 = caps[1].parse().map_err(|_| invalid())?;
    let minutes: u64 = caps[2].parse().map_err(|_| invalid())?;
    let seconds: u64 = caps[3].parse().map_err(|_| invalid())?;
    let centis: u64 = caps[4].parse().map_err(|_| invalid())?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    let whole = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    Ok(whole as f64 + centis as f64 / 100.0)
}

/// Format seconds as an ASS time string, truncating to centiseconds.
///
/// Negative and non-finite inputs are clamped to zero.
pub fn format_ass_time(seconds: f64) -> String {
    let total_cs = seconds_to_centiseconds(seconds);

    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let secs = (total_cs % 6_000) / 100;
    let centis = total_cs % 100;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Truncate seconds to whole centiseconds
fn seconds_to_centiseconds(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 100.0 + CENTISECOND_EPSILON).floor() as u64
}

/// Convert a duration in seconds to rounded centiseconds, as used by `{\kNN}` tags
pub fn duration_to_centiseconds(duration: f64) -> u64 {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (duration * 100.0).round() as u64
}
