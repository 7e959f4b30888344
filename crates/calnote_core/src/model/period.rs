//! Period domain model.
//!
//! # Responsibility
//! - Validate raw calendar input coming from the widget layer.
//! - Anchor week periods using locale-aware week rules.
//!
//! # Invariants
//! - `Period::date()` of a week period is the first day of that week.
//! - Week rules follow the "week 1 contains January N" convention, where `N`
//!   is `WeekSpec::min_days_in_first_week`.

use crate::model::date_format::format_date;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Granularity of a calendar period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
}

impl Granularity {
    /// Lowercase adjective used in notices (`daily`, `weekly`).
    pub fn adjective(self) -> &'static str {
        match self {
            Self::Day => "daily",
            Self::Week => "weekly",
        }
    }

    /// Title-case adjective used in dialog titles.
    pub fn title(self) -> &'static str {
        match self {
            Self::Day => "Daily",
            Self::Week => "Weekly",
        }
    }
}

/// Week numbering rule.
///
/// `first_day` is the weekday a week starts on; week 1 of a year is the week
/// containing January `min_days_in_first_week`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekSpec {
    pub first_day: Weekday,
    pub min_days_in_first_week: u8,
}

impl WeekSpec {
    /// ISO-8601: Monday start, week 1 contains January 4th.
    pub const ISO: WeekSpec = WeekSpec {
        first_day: Weekday::Mon,
        min_days_in_first_week: 4,
    };

    /// US convention: Sunday start, week 1 contains January 1st.
    pub const US: WeekSpec = WeekSpec {
        first_day: Weekday::Sun,
        min_days_in_first_week: 1,
    };

    /// Returns the week rule for a locale identifier (`en`, `en-gb`, `de`...).
    ///
    /// Unknown locales use ISO rules.
    pub fn for_locale(locale: &str) -> Self {
        let normalized = locale.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "" | "en" | "en-us" | "en-ca" | "ja" | "ko" | "zh-tw" | "he" | "pt-br" => Self::US,
            _ => Self::ISO,
        }
    }

    /// Same numbering rule with an explicit first weekday.
    pub fn with_first_day(self, first_day: Weekday) -> Self {
        Self { first_day, ..self }
    }

    /// Returns the first day of the week containing `date`.
    ///
    /// Saturates at `NaiveDate::MIN` for the partial week chrono cannot
    /// represent; use `checked_start_of_week` to detect that case.
    pub fn start_of_week(self, date: NaiveDate) -> NaiveDate {
        self.checked_start_of_week(date).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the week containing `date`, or `None` when it falls
    /// before `NaiveDate::MIN`.
    pub fn checked_start_of_week(self, date: NaiveDate) -> Option<NaiveDate> {
        date.checked_sub_days(Days::new(u64::from(self.weekday_index(date))))
    }

    /// Zero-based weekday position within a week using this rule.
    pub fn weekday_index(self, date: NaiveDate) -> u32 {
        (7 + date.weekday().num_days_from_sunday() - self.first_day.num_days_from_sunday()) % 7
    }

    /// Returns `(week_year, week_number)` for `date`.
    pub fn week_of(self, date: NaiveDate) -> (i32, u32) {
        let year = date.year();
        let week_year = if self
            .first_week_start(year + 1)
            .is_some_and(|next| date >= next)
        {
            year + 1
        } else if self
            .first_week_start(year)
            .is_some_and(|current| date < current)
        {
            year - 1
        } else {
            year
        };

        let Some(first) = self.first_week_start(week_year) else {
            return (week_year, 1);
        };
        let days = (self.start_of_week(date) - first).num_days();
        let week = u32::try_from(days / 7).unwrap_or(0) + 1;
        (week_year, week)
    }

    fn first_week_start(self, year: i32) -> Option<NaiveDate> {
        let anchor_day = u32::from(self.min_days_in_first_week.clamp(1, 7));
        NaiveDate::from_ymd_opt(year, 1, anchor_day)
            .and_then(|anchor| self.checked_start_of_week(anchor))
    }
}

impl Default for WeekSpec {
    fn default() -> Self {
        Self::ISO
    }
}

/// Validation failure for raw widget input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    InvalidDate { year: i32, month: u32, day: u32 },
    Unparseable(String),
}

impl Display for PeriodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { year, month, day } => {
                write!(f, "invalid calendar date: {year:04}-{month:02}-{day:02}")
            }
            Self::Unparseable(value) => write!(f, "unparseable calendar date: `{value}`"),
        }
    }
}

impl Error for PeriodError {}

/// A calendar day or week, the unit of note resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    date: NaiveDate,
    granularity: Granularity,
    week_spec: WeekSpec,
}

impl Period {
    pub fn day(date: NaiveDate, week_spec: WeekSpec) -> Self {
        Self {
            date,
            granularity: Granularity::Day,
            week_spec,
        }
    }

    /// Builds the week period containing `date`.
    pub fn week(date: NaiveDate, week_spec: WeekSpec) -> Self {
        Self {
            date: week_spec.start_of_week(date),
            granularity: Granularity::Week,
            week_spec,
        }
    }

    pub fn new(date: NaiveDate, granularity: Granularity, week_spec: WeekSpec) -> Self {
        match granularity {
            Granularity::Day => Self::day(date, week_spec),
            Granularity::Week => Self::week(date, week_spec),
        }
    }

    /// Builds a period from raw year/month/day parts.
    ///
    /// # Errors
    /// - `PeriodError::InvalidDate` when the parts do not name a real date.
    pub fn from_parts(
        year: i32,
        month: u32,
        day: u32,
        granularity: Granularity,
        week_spec: WeekSpec,
    ) -> Result<Self, PeriodError> {
        let invalid = PeriodError::InvalidDate { year, month, day };
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(invalid.clone())?;
        Self::checked(date, granularity, week_spec).ok_or(invalid)
    }

    /// Like `new`, but `None` when a week period cannot be anchored.
    pub fn checked(
        date: NaiveDate,
        granularity: Granularity,
        week_spec: WeekSpec,
    ) -> Option<Self> {
        let date = match granularity {
            Granularity::Day => date,
            Granularity::Week => week_spec.checked_start_of_week(date)?,
        };
        Some(Self {
            date,
            granularity,
            week_spec,
        })
    }

    /// Parses an ISO `YYYY-MM-DD` string.
    pub fn parse(
        value: &str,
        granularity: Granularity,
        week_spec: WeekSpec,
    ) -> Result<Self, PeriodError> {
        let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| PeriodError::Unparseable(value.to_string()))?;
        Self::checked(date, granularity, week_spec)
            .ok_or_else(|| PeriodError::Unparseable(value.to_string()))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn week_spec(&self) -> WeekSpec {
        self.week_spec
    }

    /// Whether `date` falls inside this period.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self.granularity {
            Granularity::Day => self.date == date,
            Granularity::Week => self.week_spec.start_of_week(date) == self.date,
        }
    }

    /// Formats the anchor date with a moment-style pattern.
    pub fn format(&self, pattern: &str) -> String {
        format_date(self.date, self.week_spec, pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::{Granularity, Period, PeriodError, WeekSpec};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn week_period_is_anchored_on_first_day() {
        let period = Period::week(date(2024, 3, 15), WeekSpec::ISO);
        assert_eq!(period.date(), date(2024, 3, 11));
        assert!(period.contains(date(2024, 3, 17)));
        assert!(!period.contains(date(2024, 3, 18)));

        let sunday_start = Period::week(date(2024, 3, 15), WeekSpec::US);
        assert_eq!(sunday_start.date(), date(2024, 3, 10));
    }

    #[test]
    fn from_parts_rejects_impossible_dates() {
        let err = Period::from_parts(2023, 2, 29, Granularity::Day, WeekSpec::ISO)
            .expect_err("2023 is not a leap year");
        assert_eq!(
            err,
            PeriodError::InvalidDate {
                year: 2023,
                month: 2,
                day: 29
            }
        );
        assert!(Period::from_parts(2024, 13, 1, Granularity::Week, WeekSpec::ISO).is_err());
    }

    #[test]
    fn week_before_first_representable_day_is_rejected() {
        let min = NaiveDate::MIN;
        assert_eq!(WeekSpec::ISO.checked_start_of_week(min), None);
        assert_eq!(
            Period::from_parts(min.year(), 1, 1, Granularity::Week, WeekSpec::ISO),
            Err(PeriodError::InvalidDate {
                year: min.year(),
                month: 1,
                day: 1
            })
        );
        assert!(Period::from_parts(min.year(), 1, 1, Granularity::Day, WeekSpec::ISO).is_ok());

        // Week numbering near the boundary must not panic either.
        let (week_year, week) = WeekSpec::ISO.week_of(min);
        assert_eq!(week_year, min.year());
        assert!(week >= 1);
        assert_eq!(Period::week(min, WeekSpec::ISO).date(), min);
    }

    #[test]
    fn iso_week_numbers_cross_year_boundaries() {
        assert_eq!(WeekSpec::ISO.week_of(date(2021, 1, 1)), (2020, 53));
        assert_eq!(WeekSpec::ISO.week_of(date(2024, 12, 30)), (2025, 1));
        assert_eq!(WeekSpec::ISO.week_of(date(2024, 3, 15)), (2024, 11));
    }

    #[test]
    fn us_week_one_contains_january_first() {
        assert_eq!(WeekSpec::US.week_of(date(2022, 1, 1)), (2022, 1));
        assert_eq!(WeekSpec::US.week_of(date(2021, 12, 26)), (2022, 1));
        assert_eq!(WeekSpec::US.week_of(date(2024, 3, 15)), (2024, 11));
    }

    #[test]
    fn locale_table_and_week_start_override() {
        assert_eq!(WeekSpec::for_locale("en"), WeekSpec::US);
        assert_eq!(WeekSpec::for_locale("en_GB"), WeekSpec::ISO);
        assert_eq!(WeekSpec::for_locale("xx-unknown"), WeekSpec::ISO);

        let saturday = WeekSpec::US.with_first_day(Weekday::Sat);
        assert_eq!(saturday.start_of_week(date(2024, 3, 15)), date(2024, 3, 9));
        assert_eq!(saturday.min_days_in_first_week, 1);
    }

    #[test]
    fn parse_accepts_iso_dates_only() {
        let period =
            Period::parse(" 2024-03-15 ", Granularity::Day, WeekSpec::ISO).expect("iso date");
        assert_eq!(period.date(), date(2024, 3, 15));
        assert!(matches!(
            Period::parse("15/03/2024", Granularity::Day, WeekSpec::ISO),
            Err(PeriodError::Unparseable(_))
        ));
    }
}
