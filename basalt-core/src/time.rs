//! Device timestamps.
//!
//! Pumps report local wall-clock time without a zone, so arithmetic here is
//! deliberately calendar-naive: adding a duration never applies DST or zone
//! corrections. Three shapes are accepted:
//! - naive ISO-8601 strings (`2014-03-01T08:30:00`, optional fractional seconds)
//! - RFC 3339 strings carrying an offset; the offset, a `Z` suffix and the
//!   fractional-second precision are preserved
//! - JSON integers, taken as milliseconds

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, SecondsFormat};
use serde_json::Value;

/// Output format for naive timestamps.
///
/// Naive results are normalized: fractional seconds are dropped and the hour
/// is on the 24h clock, so `13:15:00.250` plus 30 minutes renders as
/// `13:45:00`. Offset timestamps keep their input shape instead.
pub const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// A parsed device timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTime {
    /// Local wall-clock time.
    Naive(NaiveDateTime),
    /// Wall-clock time with a fixed UTC offset, and how it was written.
    Offset(DateTime<FixedOffset>, OffsetStyle),
    /// Milliseconds on an arbitrary epoch.
    Millis(i64),
}

/// Rendering details of an RFC 3339 input, reused for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetStyle {
    /// Fractional-second precision.
    pub precision: SecondsFormat,
    /// Whether UTC was written as `Z` rather than `+00:00`.
    pub zulu: bool,
}

impl OffsetStyle {
    fn of(s: &str) -> Self {
        let digits = s
            .find('.')
            .map_or(0, |dot| s[dot + 1..].chars().take_while(char::is_ascii_digit).count());
        let precision = match digits {
            0 => SecondsFormat::Secs,
            1..=3 => SecondsFormat::Millis,
            4..=6 => SecondsFormat::Micros,
            _ => SecondsFormat::Nanos,
        };
        Self {
            precision,
            zulu: s.ends_with(['Z', 'z']),
        }
    }
}

impl DeviceTime {
    /// Parse a JSON timestamp value. Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Millis),
            Value::String(s) => Self::parse_str(s),
            _ => None,
        }
    }

    fn parse_str(s: &str) -> Option<Self> {
        let s = s.trim();
        for fmt in NAIVE_INPUT_FORMATS {
            if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(Self::Naive(t));
            }
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| Self::Offset(t, OffsetStyle::of(s)))
    }

    /// Add `ms` milliseconds. Returns `None` on overflow.
    #[must_use]
    pub fn add_millis(self, ms: i64) -> Option<Self> {
        let d = Duration::try_milliseconds(ms)?;
        match self {
            Self::Naive(t) => t.checked_add_signed(d).map(Self::Naive),
            Self::Offset(t, style) => t.checked_add_signed(d).map(|t| Self::Offset(t, style)),
            Self::Millis(t) => t.checked_add(ms).map(Self::Millis),
        }
    }

    /// Render back into the JSON shape it was parsed from.
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Naive(t) => Value::String(t.format(NAIVE_FORMAT).to_string()),
            Self::Offset(t, style) => Value::String(t.to_rfc3339_opts(style.precision, style.zulu)),
            Self::Millis(t) => Value::from(t),
        }
    }
}

/// Render a timestamp value for use in an interval string.
///
/// Strings are used verbatim, `null` renders as `null`, other values as JSON.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `start/end` interval string.
#[must_use]
pub fn interval(start: &Value, end: &Value) -> String {
    format!("{}/{}", render(start), render(end))
}
