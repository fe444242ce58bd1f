//! Date and time string validation, parsing and formatting.
//!
//! All dates are plain calendar dates ([`NaiveDate`]). Comparing them never involves a time
//! zone, so a date typed on a wall clock and its ISO string always agree on the day.

use std::time::Duration;

use chrono::Datelike;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;

use crate::attrs;
use crate::error::ParseError;

fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

pub fn is_valid_date(input: &str) -> bool {
    parse_date(input).is_ok()
}

pub fn is_valid_time(input: &str) -> bool {
    parse_time(input).is_ok()
}

/// Parses a strict `YYYY-MM-DD` string.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    let err = || ParseError::InvalidDate(input.to_string());
    let s = input.trim();
    if !s.is_ascii() || s.len() != 10 || s.as_bytes()[4] != b'-' || s.as_bytes()[7] != b'-' {
        return Err(err());
    }
    let year = digits(&s[0..4]).ok_or_else(err)?;
    let month = digits(&s[5..7]).ok_or_else(err)?;
    let day = digits(&s[8..10]).ok_or_else(err)?;
    NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(err)
}

/// Parses a strict 24-hour `HH:MM` string.
pub fn parse_time(input: &str) -> Result<NaiveTime, ParseError> {
    let err = || ParseError::InvalidTime(input.to_string());
    let s = input.trim();
    if !s.is_ascii() || s.len() != 5 || s.as_bytes()[2] != b':' {
        return Err(err());
    }
    let hour = digits(&s[0..2]).ok_or_else(err)?;
    let minute = digits(&s[3..5]).ok_or_else(err)?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(err)
}

/// Parses `YYYY-MM-DDTHH:MM` (a space is accepted in place of the `T`).
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, ParseError> {
    let err = || ParseError::InvalidDateTime(input.to_string());
    let s = input.trim();
    if !s.is_ascii() || s.len() != 16 || !matches!(s.as_bytes()[10], b'T' | b' ') {
        return Err(err());
    }
    let date = parse_date(&s[..10]).map_err(|_| err())?;
    let time = parse_time(&s[11..]).map_err(|_| err())?;
    Ok(date.and_time(time))
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn to_iso_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

pub fn to_iso_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M").to_string()
}

/// Month and weekday names used by [`format_date`] and the calendar header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    /// January first.
    pub months: Vec<String>,
    /// Sunday first.
    pub weekdays: Vec<String>,
}

impl Default for Locale {
    fn default() -> Self {
        let months = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        let weekdays = [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ];
        Self {
            months: months.iter().map(|s| s.to_string()).collect(),
            weekdays: weekdays.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Locale {
    /// Builds a locale from `month-names` / `weekday-names` comma lists.
    ///
    /// Lists of the wrong length are ignored and the English names are kept.
    pub fn from_attrs(attrs: &attrs::Attrs) -> Self {
        let mut locale = Self::default();
        if let Some(raw) = attrs.get("month-names") {
            let months = attrs::parse_list(raw);
            if months.len() == 12 {
                locale.months = months;
            } else {
                tracing::warn!(len = months.len(), "month-names must list 12 names");
            }
        }
        if let Some(raw) = attrs.get("weekday-names") {
            let weekdays = attrs::parse_list(raw);
            if weekdays.len() == 7 {
                locale.weekdays = weekdays;
            } else {
                tracing::warn!(len = weekdays.len(), "weekday-names must list 7 names");
            }
        }
        locale
    }

    /// `month` is 1-based.
    pub fn month_name(&self, month: u32) -> &str {
        self.months
            .get(month.saturating_sub(1) as usize)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// `weekday` counts from Sunday = 0.
    pub fn weekday_name(&self, weekday: u32) -> &str {
        self.weekdays
            .get(weekday as usize % 7)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn short_weekday(&self, weekday: u32, len: usize) -> String {
        self.weekday_name(weekday).chars().take(len).collect()
    }
}

const TOKENS: [&str; 10] = [
    "YYYY", "YY", "MMMM", "MMM", "MM", "M", "DD", "D", "dddd", "ddd",
];

/// Formats `date` by substituting tokens in `pattern`.
///
/// Tokens: `YYYY`, `YY`, `MMMM` (month name), `MMM` (short month), `MM`, `M`, `DD`, `D`,
/// `dddd` (weekday name), `ddd` (short weekday). Text in `[...]` is copied verbatim.
pub fn format_date(date: NaiveDate, pattern: &str, locale: &Locale) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('[') {
            match body.find(']') {
                Some(end) => {
                    out.push_str(&body[..end]);
                    rest = &body[end + 1..];
                }
                None => {
                    out.push_str(body);
                    rest = "";
                }
            }
            continue;
        }

        match TOKENS.iter().find(|t| rest.starts_with(**t)) {
            Some(token) => {
                push_token(&mut out, token, date, locale);
                rest = &rest[token.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }
    }
    out
}

fn push_token(out: &mut String, token: &str, date: NaiveDate, locale: &Locale) {
    let weekday = date.weekday().num_days_from_sunday();
    match token {
        "YYYY" => out.push_str(&format!("{:04}", date.year())),
        "YY" => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
        "MMMM" => out.push_str(locale.month_name(date.month())),
        "MMM" => out.extend(locale.month_name(date.month()).chars().take(3)),
        "MM" => out.push_str(&format!("{:02}", date.month())),
        "M" => out.push_str(&date.month().to_string()),
        "DD" => out.push_str(&format!("{:02}", date.day())),
        "D" => out.push_str(&date.day().to_string()),
        "dddd" => out.push_str(locale.weekday_name(weekday)),
        "ddd" => out.push_str(&locale.short_weekday(weekday, 3)),
        _ => out.push_str(token),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(input: &str) -> Result<Rgba, ParseError> {
    let err = || ParseError::InvalidHexColor(input.to_string());
    let hex = input.trim().strip_prefix('#').ok_or_else(err)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(err());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
            Ok(Rgba {
                r: expand(0)?,
                g: expand(1)?,
                b: expand(2)?,
                a: 0xff,
            })
        }
        6 | 8 => Ok(Rgba {
            r: channel(&hex[0..2])?,
            g: channel(&hex[2..4])?,
            b: channel(&hex[4..6])?,
            a: if hex.len() == 8 {
                channel(&hex[6..8])?
            } else {
                0xff
            },
        }),
        _ => Err(err()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeUnit {
    Px,
    Rem,
    Em,
    Percent,
    Vh,
    Vw,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub value: f32,
    pub unit: SizeUnit,
}

/// Parses a CSS-like length such as `12px`, `1.5rem` or `50%`.
pub fn parse_size(input: &str) -> Result<Size, ParseError> {
    let err = || ParseError::InvalidSize(input.to_string());
    let s = input.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(err)?;
    let (num, unit) = s.split_at(split);
    let value: f32 = num.parse().map_err(|_| err())?;
    let unit = match unit {
        "px" => SizeUnit::Px,
        "rem" => SizeUnit::Rem,
        "em" => SizeUnit::Em,
        "%" => SizeUnit::Percent,
        "vh" => SizeUnit::Vh,
        "vw" => SizeUnit::Vw,
        _ => return Err(err()),
    };
    Ok(Size { value, unit })
}

/// Parses `150ms` or `1.5s`.
pub fn parse_duration(input: &str) -> Result<Duration, ParseError> {
    let err = || ParseError::InvalidDuration(input.to_string());
    let s = input.trim();
    let (num, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else {
        return Err(err());
    };
    let value: f64 = num.parse().map_err(|_| err())?;
    if !value.is_finite() || value < 0.0 {
        return Err(err());
    }
    Ok(Duration::from_nanos((value * scale * 1e9).round() as u64))
}
