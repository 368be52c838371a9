//! Tick based datetime and timespan helpers.
//!
//! Both datetimes and timespans are stored as `i64` ticks of 100ns. Datetimes
//! count ticks since the unix epoch.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub const TICKS_PER_MICROSECOND: i64 = 10;
pub const TICKS_PER_MILLISECOND: i64 = 10_000;
pub const TICKS_PER_SECOND: i64 = 10_000_000;
pub const TICKS_PER_MINUTE: i64 = 60 * TICKS_PER_SECOND;
pub const TICKS_PER_HOUR: i64 = 60 * TICKS_PER_MINUTE;
pub const TICKS_PER_DAY: i64 = 24 * TICKS_PER_HOUR;

const NANOS_PER_TICK: i64 = 100;

pub fn ticks_to_naive(ticks: i64) -> Option<NaiveDateTime> {
    let secs = ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
    DateTime::from_timestamp(secs, nanos as u32).map(|dt| dt.naive_utc())
}

pub fn naive_to_ticks(dt: &NaiveDateTime) -> Option<i64> {
    let utc = dt.and_utc();
    utc.timestamp()
        .checked_mul(TICKS_PER_SECOND)?
        .checked_add(i64::from(utc.timestamp_subsec_nanos()) / NANOS_PER_TICK)
}

pub fn date_to_ticks(date: NaiveDate) -> Option<i64> {
    naive_to_ticks(&date.and_time(NaiveTime::MIN))
}

/// Render as `yyyy-MM-ddTHH:mm:ss.fffffff`.
pub fn format_datetime(ticks: i64) -> String {
    match ticks_to_naive(ticks) {
        Some(dt) => format!(
            "{}.{:07}",
            dt.format("%Y-%m-%dT%H:%M:%S"),
            dt.nanosecond() / NANOS_PER_TICK as u32
        ),
        None => ticks.to_string(),
    }
}

/// Render as `M/d/yyyy h:mm:ss AM`, the form produced by `tostring`.
pub fn format_datetime_general(ticks: i64) -> String {
    match ticks_to_naive(ticks) {
        Some(dt) => dt.format("%-m/%-d/%Y %-I:%M:%S %p").to_string(),
        None => ticks.to_string(),
    }
}

/// Render as `[-][d.]hh:mm:ss[.fffffff]`.
pub fn format_timespan(ticks: i64) -> String {
    let sign = if ticks < 0 { "-" } else { "" };
    let abs = ticks.unsigned_abs();

    let days = abs / TICKS_PER_DAY as u64;
    let rem = abs % TICKS_PER_DAY as u64;
    let hours = rem / TICKS_PER_HOUR as u64;
    let rem = rem % TICKS_PER_HOUR as u64;
    let minutes = rem / TICKS_PER_MINUTE as u64;
    let rem = rem % TICKS_PER_MINUTE as u64;
    let seconds = rem / TICKS_PER_SECOND as u64;
    let fraction = rem % TICKS_PER_SECOND as u64;

    let mut out = String::from(sign);
    if days > 0 {
        out.push_str(&format!("{days}."));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if fraction > 0 {
        out.push_str(&format!(".{fraction:07}"));
    }

    out
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

/// Parse a datetime from text, returning None if the text isn't a
/// recognized datetime.
pub fn parse_datetime(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return naive_to_ticks(&dt.naive_utc());
    }

    let trimmed = text.trim_end_matches('Z');
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return naive_to_ticks(&dt);
        }
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date_to_ticks(date);
        }
    }

    None
}

/// Parse a timespan from either the clock form (`1.02:03:04.5`) or a
/// literal with a unit suffix (`10s`, `1.5h`, `100ms`).
pub fn parse_timespan(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let ticks = if body.contains(':') {
        parse_clock_timespan(body)?
    } else {
        parse_unit_timespan(body)?
    };

    Some(if negative { -ticks } else { ticks })
}

fn parse_clock_timespan(text: &str) -> Option<i64> {
    let (days, clock) = match text.split_once(':') {
        Some((head, _)) if head.contains('.') => {
            let (days, rest) = text.split_once('.')?;
            (days.parse::<i64>().ok()?, rest)
        }
        _ => (0, text),
    };

    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let seconds_part = parts.next().unwrap_or("0");
    if parts.next().is_some() {
        return None;
    }

    let (seconds, fraction) = match seconds_part.split_once('.') {
        Some((s, f)) => (s.parse::<i64>().ok()?, f),
        None => (seconds_part.parse::<i64>().ok()?, ""),
    };

    if minutes >= 60 || seconds >= 60 {
        return None;
    }

    let mut fraction_ticks = 0;
    if !fraction.is_empty() {
        if fraction.len() > 7 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        fraction_ticks = format!("{fraction:0<7}").parse::<i64>().ok()?;
    }

    days.checked_mul(TICKS_PER_DAY)?
        .checked_add(hours.checked_mul(TICKS_PER_HOUR)?)?
        .checked_add(minutes * TICKS_PER_MINUTE)?
        .checked_add(seconds * TICKS_PER_SECOND)?
        .checked_add(fraction_ticks)
}

fn parse_unit_timespan(text: &str) -> Option<i64> {
    const UNITS: &[(&str, i64)] = &[
        ("microseconds", TICKS_PER_MICROSECOND),
        ("microsecond", TICKS_PER_MICROSECOND),
        ("milliseconds", TICKS_PER_MILLISECOND),
        ("millisecond", TICKS_PER_MILLISECOND),
        ("seconds", TICKS_PER_SECOND),
        ("second", TICKS_PER_SECOND),
        ("minutes", TICKS_PER_MINUTE),
        ("minute", TICKS_PER_MINUTE),
        ("hours", TICKS_PER_HOUR),
        ("hour", TICKS_PER_HOUR),
        ("days", TICKS_PER_DAY),
        ("day", TICKS_PER_DAY),
        ("ticks", 1),
        ("tick", 1),
        ("ms", TICKS_PER_MILLISECOND),
        ("d", TICKS_PER_DAY),
        ("h", TICKS_PER_HOUR),
        ("m", TICKS_PER_MINUTE),
        ("s", TICKS_PER_SECOND),
    ];

    for (suffix, multiplier) in UNITS {
        if let Some(number) = text.strip_suffix(suffix) {
            if number.is_empty() {
                continue;
            }
            let value: f64 = number.parse().ok()?;
            let ticks = value * (*multiplier as f64);
            if !ticks.is_finite() || ticks.abs() > i64::MAX as f64 {
                return None;
            }
            return Some(ticks.round() as i64);
        }
    }

    None
}

pub fn start_of_day(dt: &NaiveDateTime) -> NaiveDateTime {
    dt.date().and_time(NaiveTime::MIN)
}

/// Start of the week containing `dt`, weeks start on Sunday.
pub fn start_of_week(dt: &NaiveDateTime) -> NaiveDateTime {
    let days_since_sunday = dt.weekday().num_days_from_sunday();
    start_of_day(dt) - chrono::Duration::days(i64::from(days_since_sunday))
}

pub fn start_of_month(dt: &NaiveDateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(dt.year(), dt.month(), 1).map(|d| d.and_time(NaiveTime::MIN))
}

pub fn start_of_year(dt: &NaiveDateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(dt.year(), 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}

pub fn start_of_next_month(dt: &NaiveDateTime) -> Option<NaiveDateTime> {
    let (year, month) = if dt.month() == 12 {
        (dt.year() + 1, 1)
    } else {
        (dt.year(), dt.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(NaiveTime::MIN))
}

pub fn start_of_next_year(dt: &NaiveDateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(dt.year() + 1, 1, 1).map(|d| d.and_time(NaiveTime::MIN))
}
