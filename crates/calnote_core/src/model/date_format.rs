//! Moment-compatible date formatting.
//!
//! Note names and template tokens are written with moment.js patterns
//! (`YYYY-MM-DD`, `gggg-[W]ww`), so the same grammar is rendered here on top of
//! `chrono::NaiveDate`. Names are English; locale only affects week numbering.

use crate::model::period::WeekSpec;
use chrono::{Datelike, NaiveDate};

const MONTH_NAMES: [&str; 12] = [
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

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

// Longest tokens first so `MMMM` wins over `MM` and `M`.
const TOKENS: &[&str] = &[
    "YYYY", "GGGG", "gggg", "MMMM", "DDDD", "dddd", "MMM", "DDD", "ddd", "YY", "GG", "gg", "MM",
    "Do", "DD", "dd", "WW", "ww", "Q", "M", "D", "d", "E", "e", "W", "w",
];

/// Formats `date` using a moment-style `pattern`.
///
/// Text inside `[...]` is copied literally. Characters that are not part of a
/// known token are copied verbatim.
pub fn format_date(date: NaiveDate, week_spec: WeekSpec, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            match rest[1..].find(']') {
                Some(end) => {
                    out.push_str(&rest[1..1 + end]);
                    rest = &rest[end + 2..];
                }
                None => {
                    out.push_str(&rest[1..]);
                    rest = "";
                }
            }
            continue;
        }

        if let Some(token) = TOKENS.iter().find(|token| rest.starts_with(**token)) {
            render_token(&mut out, token, date, week_spec);
            rest = &rest[token.len()..];
            continue;
        }

        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

fn render_token(out: &mut String, token: &str, date: NaiveDate, week_spec: WeekSpec) {
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let rendered = match token {
        "YYYY" => format!("{:04}", date.year()),
        "YY" => format!("{:02}", date.year().rem_euclid(100)),
        "Q" => format!("{}", (date.month() - 1) / 3 + 1),
        "MMMM" => MONTH_NAMES[date.month0() as usize].to_string(),
        "MMM" => MONTH_NAMES[date.month0() as usize][..3].to_string(),
        "MM" => format!("{:02}", date.month()),
        "M" => format!("{}", date.month()),
        "DDDD" => format!("{:03}", date.ordinal()),
        "DDD" => format!("{}", date.ordinal()),
        "DD" => format!("{:02}", date.day()),
        "D" => format!("{}", date.day()),
        "Do" => format!("{}{}", date.day(), ordinal_suffix(date.day())),
        "dddd" => WEEKDAY_NAMES[weekday].to_string(),
        "ddd" => WEEKDAY_NAMES[weekday][..3].to_string(),
        "dd" => WEEKDAY_NAMES[weekday][..2].to_string(),
        "d" => format!("{weekday}"),
        "e" => format!("{}", week_spec.weekday_index(date)),
        "E" => format!("{}", date.weekday().number_from_monday()),
        "WW" => format!("{:02}", WeekSpec::ISO.week_of(date).1),
        "W" => format!("{}", WeekSpec::ISO.week_of(date).1),
        "GGGG" => format!("{:04}", WeekSpec::ISO.week_of(date).0),
        "GG" => format!("{:02}", WeekSpec::ISO.week_of(date).0.rem_euclid(100)),
        "ww" => format!("{:02}", week_spec.week_of(date).1),
        "w" => format!("{}", week_spec.week_of(date).1),
        "gggg" => format!("{:04}", week_spec.week_of(date).0),
        "gg" => format!("{:02}", week_spec.week_of(date).0.rem_euclid(100)),
        other => other.to_string(),
    };
    out.push_str(&rendered);
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
