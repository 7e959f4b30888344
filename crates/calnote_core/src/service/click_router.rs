//! Calendar click entry points.
//!
//! # Responsibility
//! - Validate raw widget input into a `Period`.
//! - Route valid clicks into find-or-create and publish the opened file.
//!
//! # Invariants
//! - Invalid clicks are logged and abort with no vault, pane, or notice
//!   side effects.
//! - At most one pane is opened per click.

use crate::host::{Host, OpenMode};
use crate::model::note::NoteRecord;
use crate::model::period::{Granularity, Period, PeriodError};
use crate::service::note_materializer::{MaterializeOutcome, NoteMaterializer};
use crate::settings::persistence::SettingsPersistence;
use crate::store::active_file::ActiveFileStore;
use crate::store::config_store::ConfigStore;
use chrono::{Datelike, NaiveDate};
use log::{error, info};

/// Raw click reported by the calendar widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarClick {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub granularity: Granularity,
}

impl CalendarClick {
    pub fn day(date: NaiveDate) -> Self {
        Self::at(date, Granularity::Day)
    }

    pub fn week(date: NaiveDate) -> Self {
        Self::at(date, Granularity::Week)
    }

    fn at(date: NaiveDate, granularity: Granularity) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
            granularity,
        }
    }
}

#[derive(Debug)]
pub enum ClickOutcome {
    /// The click did not name a real calendar date.
    Rejected(PeriodError),
    Resolved(MaterializeOutcome),
}

impl ClickOutcome {
    pub fn record(&self) -> Option<&NoteRecord> {
        match self {
            Self::Rejected(_) => None,
            Self::Resolved(outcome) => outcome.record(),
        }
    }
}

/// Routes calendar clicks to notes.
pub struct ClickRouter<'a, H: Host, P: SettingsPersistence> {
    host: &'a H,
    config: &'a ConfigStore<P>,
    active_file: &'a ActiveFileStore,
}

impl<'a, H: Host, P: SettingsPersistence> ClickRouter<'a, H, P> {
    pub fn new(
        host: &'a H,
        config: &'a ConfigStore<P>,
        active_file: &'a ActiveFileStore,
    ) -> Self {
        Self {
            host,
            config,
            active_file,
        }
    }

    /// Handles one click on a day or week cell.
    pub async fn on_period_click(
        &self,
        click: &CalendarClick,
        open_in_new_split: bool,
    ) -> ClickOutcome {
        let settings = self.config.get();
        let week_spec = settings.week_spec(&self.host.system_locale());

        let period = match Period::from_parts(
            click.year,
            click.month,
            click.day,
            click.granularity,
            week_spec,
        ) {
            Ok(period) => period,
            Err(err) => {
                error!(
                    "event=calendar_click module=router status=error error_code=invalid_period error={}",
                    err
                );
                return ClickOutcome::Rejected(err);
            }
        };

        info!(
            "event=calendar_click module=router status=ok kind={} date={} new_split={}",
            click.granularity.adjective(),
            period.date(),
            open_in_new_split
        );

        let outcome = NoteMaterializer::new(self.host)
            .resolve_or_create(
                &period,
                &settings,
                OpenMode::active(open_in_new_split),
                |record| self.active_file.set(record.file.clone()),
            )
            .await;
        ClickOutcome::Resolved(outcome)
    }

    pub async fn on_day_click(&self, date: NaiveDate, open_in_new_split: bool) -> ClickOutcome {
        self.on_period_click(&CalendarClick::day(date), open_in_new_split)
            .await
    }

    pub async fn on_week_click(&self, date: NaiveDate, open_in_new_split: bool) -> ClickOutcome {
        self.on_period_click(&CalendarClick::week(date), open_in_new_split)
            .await
    }

    /// Opens (or creates) the weekly note for the week containing `today`.
    pub async fn open_or_create_weekly_note(
        &self,
        today: NaiveDate,
        open_in_new_split: bool,
    ) -> ClickOutcome {
        self.on_week_click(today, open_in_new_split).await
    }
}
