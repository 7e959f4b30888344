//! Canonical settings schema.
//!
//! # Invariants
//! - Serialized keys are camelCase and stable; new keys must have defaults so
//!   older blobs keep loading.
//! - `words_per_dot` is either a positive integer or unset. Invalid input is
//!   stored as unset, never as zero.

use crate::model::period::WeekSpec;
use chrono::Weekday;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::num::NonZeroU32;

pub const DEFAULT_WORDS_PER_DOT: u32 = 250;
pub const DEFAULT_DAILY_FORMAT: &str = "YYYY-MM-DD";
pub const DEFAULT_WEEK_FORMAT: &str = "gggg-[W]ww";

const SYSTEM_DEFAULT_LOCALE: &str = "system-default";

/// First day of the week shown by the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Follow the active locale.
    #[default]
    Locale,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekStart {
    pub fn weekday(self) -> Option<Weekday> {
        match self {
            Self::Locale => None,
            Self::Sunday => Some(Weekday::Sun),
            Self::Monday => Some(Weekday::Mon),
            Self::Tuesday => Some(Weekday::Tue),
            Self::Wednesday => Some(Weekday::Wed),
            Self::Thursday => Some(Weekday::Thu),
            Self::Friday => Some(Weekday::Fri),
            Self::Saturday => Some(Weekday::Sat),
        }
    }
}

/// Locale used for week numbering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LocaleOverride {
    #[default]
    SystemDefault,
    Explicit(String),
}

impl Serialize for LocaleOverride {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::SystemDefault => serializer.serialize_str(SYSTEM_DEFAULT_LOCALE),
            Self::Explicit(locale) => serializer.serialize_str(locale),
        }
    }
}

impl<'de> Deserialize<'de> for LocaleOverride {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == SYSTEM_DEFAULT_LOCALE {
            Ok(Self::SystemDefault)
        } else {
            Ok(Self::Explicit(trimmed.to_string()))
        }
    }
}

/// The single authoritative configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub week_start: WeekStart,
    pub should_confirm_before_create: bool,

    /// Master switch for every dot counter.
    pub enable_dot_counters: bool,
    #[serde(deserialize_with = "deserialize_words_per_dot")]
    pub words_per_dot: Option<NonZeroU32>,
    pub show_word_count: bool,
    pub show_tasks: bool,
    pub show_streaks: bool,
    pub show_tags: bool,

    pub show_weekly_note: bool,
    /// Empty means "use the periodic-notes default".
    pub weekly_note_format: String,
    pub weekly_note_template: String,
    pub weekly_note_folder: String,

    pub locale_override: LocaleOverride,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::Locale,
            should_confirm_before_create: true,
            enable_dot_counters: true,
            words_per_dot: NonZeroU32::new(DEFAULT_WORDS_PER_DOT),
            show_word_count: true,
            show_tasks: true,
            show_streaks: true,
            show_tags: true,
            show_weekly_note: false,
            weekly_note_format: String::new(),
            weekly_note_template: String::new(),
            weekly_note_folder: String::new(),
            locale_override: LocaleOverride::SystemDefault,
        }
    }
}

impl Settings {
    /// Words per dot, falling back to the default when unset.
    pub fn effective_words_per_dot(&self) -> u32 {
        self.words_per_dot
            .map_or(DEFAULT_WORDS_PER_DOT, NonZeroU32::get)
    }

    /// Active locale identifier.
    pub fn locale<'a>(&'a self, system_locale: &'a str) -> &'a str {
        match &self.locale_override {
            LocaleOverride::SystemDefault => system_locale,
            LocaleOverride::Explicit(locale) => locale.as_str(),
        }
    }

    /// Week rule for the active locale with the configured week start applied.
    pub fn week_spec(&self, system_locale: &str) -> WeekSpec {
        let spec = WeekSpec::for_locale(self.locale(system_locale));
        match self.week_start.weekday() {
            Some(first_day) => spec.with_first_day(first_day),
            None => spec,
        }
    }

    /// Shallow merge: every field present in `patch` replaces the current one.
    pub fn merged(&self, patch: SettingsPatch) -> Settings {
        let current = self.clone();
        Settings {
            week_start: patch.week_start.unwrap_or(current.week_start),
            should_confirm_before_create: patch
                .should_confirm_before_create
                .unwrap_or(current.should_confirm_before_create),
            enable_dot_counters: patch
                .enable_dot_counters
                .unwrap_or(current.enable_dot_counters),
            words_per_dot: patch.words_per_dot.unwrap_or(current.words_per_dot),
            show_word_count: patch.show_word_count.unwrap_or(current.show_word_count),
            show_tasks: patch.show_tasks.unwrap_or(current.show_tasks),
            show_streaks: patch.show_streaks.unwrap_or(current.show_streaks),
            show_tags: patch.show_tags.unwrap_or(current.show_tags),
            show_weekly_note: patch.show_weekly_note.unwrap_or(current.show_weekly_note),
            weekly_note_format: patch
                .weekly_note_format
                .unwrap_or(current.weekly_note_format),
            weekly_note_template: patch
                .weekly_note_template
                .unwrap_or(current.weekly_note_template),
            weekly_note_folder: patch
                .weekly_note_folder
                .unwrap_or(current.weekly_note_folder),
            locale_override: patch.locale_override.unwrap_or(current.locale_override),
        }
    }

    /// Serializes into the persisted blob shape.
    pub fn to_blob(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Builds settings by merging a persisted blob over defaults.
    ///
    /// Keys are merged one at a time. A value that does not decode for its
    /// field is dropped and the default is kept. Unknown keys are ignored.
    pub fn from_blob(blob: Option<&Value>) -> Settings {
        let defaults = Settings::default();
        let Some(Value::Object(persisted)) = blob else {
            if blob.is_some_and(|value| !value.is_null()) {
                warn!("event=settings_hydrate module=settings status=skip reason=not_an_object");
            }
            return defaults;
        };
        let Ok(Value::Object(mut merged)) = defaults.to_blob() else {
            return defaults;
        };

        for (key, value) in persisted {
            if !merged.contains_key(key) {
                continue;
            }
            let mut candidate: Map<String, Value> = merged.clone();
            candidate.insert(key.clone(), value.clone());
            if serde_json::from_value::<Settings>(Value::Object(candidate)).is_ok() {
                merged.insert(key.clone(), value.clone());
            } else {
                warn!(
                    "event=settings_hydrate module=settings status=skip reason=invalid_value key={}",
                    key
                );
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or(defaults)
    }
}

/// Partial override applied by `ConfigStore::patch`.
///
/// `None` leaves a field untouched. For `words_per_dot`, `Some(None)` clears
/// the threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub week_start: Option<WeekStart>,
    pub should_confirm_before_create: Option<bool>,
    pub enable_dot_counters: Option<bool>,
    pub words_per_dot: Option<Option<NonZeroU32>>,
    pub show_word_count: Option<bool>,
    pub show_tasks: Option<bool>,
    pub show_streaks: Option<bool>,
    pub show_tags: Option<bool>,
    pub show_weekly_note: Option<bool>,
    pub weekly_note_format: Option<String>,
    pub weekly_note_template: Option<String>,
    pub weekly_note_folder: Option<String>,
    pub locale_override: Option<LocaleOverride>,
}

impl SettingsPatch {
    /// Patch built from the "words per dot" text field.
    pub fn words_per_dot_input(text: &str) -> Self {
        Self {
            words_per_dot: Some(parse_words_per_dot(text)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parses text input into a positive threshold; anything else is unset.
pub fn parse_words_per_dot(text: &str) -> Option<NonZeroU32> {
    text.trim().parse::<u32>().ok().and_then(NonZeroU32::new)
}

fn deserialize_words_per_dot<'de, D>(deserializer: D) -> Result<Option<NonZeroU32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Number(number) => number
            .as_u64()
            .and_then(|value| u32::try_from(value).ok())
            .and_then(NonZeroU32::new),
        Value::String(text) => parse_words_per_dot(&text),
        _ => None,
    })
}
