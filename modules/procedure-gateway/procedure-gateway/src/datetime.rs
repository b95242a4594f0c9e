//! Date-time rendering with the PDA format keys.
//!
//! Keys are matched after upper-casing. `DD` stands for the day in date keys
//! and for minutes in time keys (`HH:DD`), exactly as the PDA screens expect.
//! Failures are reported in-band: `"Invalid Date"` for input that cannot be
//! parsed and `"Invalid format"` for an unknown key.

use std::sync::LazyLock;

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

pub const INVALID_DATE: &str = "Invalid Date";
pub const INVALID_FORMAT: &str = "Invalid format";

/// Key used by [`now`] when none is given.
pub const DEFAULT_FORMAT: &str = "YYYY-MM-DD HH:DD:SS";

/// Supported format keys, in documentation order.
pub const FORMAT_KEYS: [&str; 9] = [
    "YYYY-MM-DD",
    "YYYY-MM-DD HH:DD:SS",
    "YYYY-MM-DD HH:DD:SS.SSS",
    "YYYY",
    "MM",
    "DD",
    "HH:DD",
    "HH:DD:SS",
    "HH:DD:SS.000",
];

// `YYYY-MM-DD <AM|PM marker> h:mm:ss`, as rendered by Korean-locale servers.
#[allow(clippy::expect_used)] // good regex, it doesn't panic
static MERIDIEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4})-(\d{2})-(\d{2})\s(\x{c624}\x{c804}|\x{c624}\x{d6c4})\s(\d{1,2}):(\d{2}):(\d{2})",
    )
    .expect("static regex should not panic")
});

const PM_MARKER: &str = "\u{c624}\u{d6c4}";

// Zone-less inputs read in the caller's zone.
const LOCAL_DATE_TIMES: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];
const LOCAL_DATES: [&str; 2] = ["%Y/%m/%d", "%B %d, %Y"];

/// Something that can be rendered as a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput<'a> {
    Instant(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    Text(&'a str),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::Instant(instant)
    }
}

impl From<i64> for DateInput<'_> {
    fn from(millis: i64) -> Self {
        Self::EpochMillis(millis)
    }
}

/// Time zone used both to read zone-less text and to render the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderZone {
    #[default]
    Local,
    Utc,
}

/// Render `input` with the format key `format`.
///
/// An unparseable input wins over an unknown key, so a bad date with a bad
/// key yields `"Invalid Date"`.
#[must_use]
pub fn format_date(format: &str, input: DateInput<'_>, zone: RenderZone) -> String {
    match zone {
        RenderZone::Local => format_in(format, input, &Local),
        RenderZone::Utc => format_in(format, input, &Utc),
    }
}

/// Render the current instant in local time; `None` uses [`DEFAULT_FORMAT`].
#[must_use]
pub fn now(format: Option<&str>) -> String {
    format_date(
        format.unwrap_or(DEFAULT_FORMAT),
        DateInput::Instant(Utc::now()),
        RenderZone::Local,
    )
}

/// Parse `input`, reading zone-less text in `zone`.
#[must_use]
pub fn parse_date(input: DateInput<'_>, zone: RenderZone) -> Option<DateTime<Utc>> {
    match zone {
        RenderZone::Local => resolve(input, &Local),
        RenderZone::Utc => resolve(input, &Utc),
    }
}

fn format_in<Tz: TimeZone>(format: &str, input: DateInput<'_>, tz: &Tz) -> String {
    let Some(instant) = resolve(input, tz) else {
        return INVALID_DATE.to_owned();
    };
    let Some(pattern) = pattern_for(format) else {
        return INVALID_FORMAT.to_owned();
    };
    instant.with_timezone(tz).naive_local().format(pattern).to_string()
}

fn pattern_for(format: &str) -> Option<&'static str> {
    let pattern = match format.to_uppercase().as_str() {
        "YYYY-MM-DD" => "%Y-%m-%d",
        "YYYY-MM-DD HH:DD:SS" => "%Y-%m-%d %H:%M:%S",
        "YYYY-MM-DD HH:DD:SS.SSS" => "%Y-%m-%d %H:%M:%S%.3f",
        "YYYY" => "%Y",
        "MM" => "%m",
        "DD" => "%d",
        "HH:DD" => "%H:%M",
        "HH:DD:SS" => "%H:%M:%S",
        "HH:DD:SS.000" => "%H:%M:%S%.3f",
        _ => return None,
    };
    Some(pattern)
}

fn resolve<Tz: TimeZone>(input: DateInput<'_>, tz: &Tz) -> Option<DateTime<Utc>> {
    match input {
        DateInput::Instant(instant) => Some(instant),
        DateInput::EpochMillis(millis) => DateTime::from_timestamp_millis(millis),
        DateInput::Text(text) => parse_text(text, tz),
    }
}

fn parse_text<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Numeric text is an epoch timestamp; fractional digits are dropped.
    if trimmed.parse::<f64>().is_ok() {
        return leading_integer(trimmed).and_then(DateTime::from_timestamp_millis);
    }

    if let Some(instant) = parse_meridiem(trimmed, tz) {
        return Some(instant);
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(instant.with_timezone(&Utc));
    }

    // A bare ISO date is midnight UTC; every other zone-less form is local.
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    for pattern in LOCAL_DATE_TIMES {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return in_zone(&naive, tz);
        }
    }

    for pattern in LOCAL_DATES {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return in_zone(&date.and_time(NaiveTime::MIN), tz);
        }
    }

    None
}

fn parse_meridiem<Tz: TimeZone>(text: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let caps = MERIDIEM_RE.captures(text)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let (month, day) = (number(2)?, number(3)?);
    let mut hour = number(5)?;
    let (minute, second) = (number(6)?, number(7)?);

    let is_pm = caps.get(4)?.as_str() == PM_MARKER;
    if is_pm && hour != 12 {
        hour += 12;
    } else if !is_pm && hour == 12 {
        hour = 0;
    }

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    in_zone(&naive, tz)
}

fn in_zone<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().ok()
}
