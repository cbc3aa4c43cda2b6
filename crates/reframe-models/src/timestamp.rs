//! Transcript timestamp parsing.
//!
//! Transcripts store segment bounds as strings in one of:
//! - `MM:SS:mmm` (third component is milliseconds, not seconds)
//! - `MM:SS` (seconds may carry a fraction)
//! - `SS` or `SS.mmm`

use thiserror::Error;

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,
    #[error("Timestamp cannot be negative")]
    Negative,
    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),
    #[error("Invalid timestamp format '{0}'. Use MM:SS:mmm, MM:SS or SS")]
    InvalidFormat(String),
}

fn component(name: &'static str, raw: &str) -> Result<f64, TimestampError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| TimestampError::InvalidValue(name, raw.to_string()))?;
    if !value.is_finite() {
        return Err(TimestampError::InvalidValue(name, raw.to_string()));
    }
    if value < 0.0 {
        return Err(TimestampError::Negative);
    }
    Ok(value)
}

/// Parse a transcript timestamp to seconds.
///
/// # Examples
/// ```
/// use reframe_models::timestamp::parse_transcript_timestamp;
/// assert_eq!(parse_transcript_timestamp("01:30:500").unwrap(), 90.5);
/// assert_eq!(parse_transcript_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_transcript_timestamp("12.25").unwrap(), 12.25);
/// ```
pub fn parse_transcript_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    match parts.as_slice() {
        [seconds] => component("seconds", seconds),
        [minutes, seconds] => {
            Ok(component("minutes", minutes)? * 60.0 + component("seconds", seconds)?)
        }
        [minutes, seconds, millis] => Ok(component("minutes", minutes)? * 60.0
            + component("seconds", seconds)?
            + component("milliseconds", millis)? / 1000.0),
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Format seconds as `MM:SS:mmm`, the transcript storage format.
pub fn format_transcript_timestamp(total_secs: f64) -> String {
    let total_ms = (total_secs.max(0.0) * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:03}", minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_seconds_millis() {
        assert_eq!(parse_transcript_timestamp("00:00:000").unwrap(), 0.0);
        assert_eq!(parse_transcript_timestamp("00:01:000").unwrap(), 1.0);
        let t = parse_transcript_timestamp("02:03:250").unwrap();
        assert!((t - 123.25).abs() < 1e-9);
    }

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse_transcript_timestamp("05:30").unwrap(), 330.0);
        assert_eq!(parse_transcript_timestamp("75:00").unwrap(), 4500.0);
        let t = parse_transcript_timestamp("00:02.5").unwrap();
        assert!((t - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_transcript_timestamp(""), Err(TimestampError::Empty)));
        assert!(matches!(
            parse_transcript_timestamp("ab:10"),
            Err(TimestampError::InvalidValue("minutes", _))
        ));
        assert!(matches!(
            parse_transcript_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(parse_transcript_timestamp("-1:00"), Err(TimestampError::Negative)));
    }

    #[test]
    fn test_format_transcript_timestamp() {
        assert_eq!(format_transcript_timestamp(0.0), "00:00:000");
        assert_eq!(format_transcript_timestamp(123.25), "02:03:250");
        let back = parse_transcript_timestamp(&format_transcript_timestamp(61.5)).unwrap();
        assert!((back - 61.5).abs() < 1e-9);
    }
}
