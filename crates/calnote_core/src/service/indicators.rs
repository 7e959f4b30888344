//! Calendar-cell indicators (dot counters).
//!
//! # Invariants
//! - With `enable_dot_counters` off, every indicator is empty regardless of
//!   its own flag.
//! - Word-count dots are clamped to `1..=MAX_WORD_DOTS` for a non-empty note.

use crate::host::{Host, NoteIndex, Vault};
use crate::model::period::Period;
use crate::settings::schema::Settings;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_WORD_DOTS: u32 = 5;

static OPEN_TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)(?:-|\*) \[ \]").expect("valid open task regex"));
static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Han}\p{Hiragana}\p{Katakana}\p{Hangul}]|[\p{L}\p{N}'’_-]+")
        .expect("valid word regex")
});
static FRONTMATTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\n.*?\n---(?:\n|\z)").expect("valid frontmatter regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    WordCount,
    Tasks,
    Streak,
    Tags,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [Self::WordCount, Self::Tasks, Self::Streak, Self::Tags];

    pub fn id(self) -> &'static str {
        match self {
            Self::WordCount => "word-count",
            Self::Tasks => "tasks",
            Self::Streak => "streak",
            Self::Tags => "custom-tags",
        }
    }

    /// Whether this indicator is visible under `settings`.
    pub fn is_enabled(self, settings: &Settings) -> bool {
        if !settings.enable_dot_counters {
            return false;
        }
        match self {
            Self::WordCount => settings.show_word_count,
            Self::Tasks => settings.show_tasks,
            Self::Streak => settings.show_streaks,
            Self::Tags => settings.show_tags,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dot {
    pub class_name: Option<&'static str>,
    pub is_filled: bool,
}

impl Dot {
    fn filled() -> Self {
        Self {
            class_name: None,
            is_filled: true,
        }
    }
}

/// Value and dots shown in one calendar cell for one indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorMetadata {
    pub value: Option<u32>,
    pub dots: Vec<Dot>,
}

impl IndicatorMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.dots.is_empty()
    }
}

/// Computes one indicator from the note content (`None` = no note).
pub fn metadata(
    kind: IndicatorKind,
    settings: &Settings,
    content: Option<&str>,
) -> IndicatorMetadata {
    if !kind.is_enabled(settings) {
        return IndicatorMetadata::empty();
    }

    match (kind, content) {
        (IndicatorKind::Tags, None) => IndicatorMetadata::empty(),
        (_, None) => IndicatorMetadata {
            value: Some(0),
            dots: Vec::new(),
        },
        (IndicatorKind::WordCount, Some(text)) => {
            let words = word_count(text);
            let dots = word_dots(words, settings.effective_words_per_dot());
            IndicatorMetadata {
                value: Some(words),
                dots: (0..dots).map(|_| Dot::filled()).collect(),
            }
        }
        (IndicatorKind::Tasks, Some(text)) => {
            let open = open_task_count(text);
            let dots = if open > 0 {
                vec![Dot {
                    class_name: Some("task"),
                    is_filled: false,
                }]
            } else {
                Vec::new()
            };
            IndicatorMetadata {
                value: Some(open),
                dots,
            }
        }
        (IndicatorKind::Streak, Some(_)) => IndicatorMetadata {
            value: Some(1),
            dots: vec![Dot::filled()],
        },
        (IndicatorKind::Tags, Some(_)) => IndicatorMetadata {
            value: None,
            dots: vec![Dot::filled()],
        },
    }
}

/// Counts words, skipping a leading YAML frontmatter block.
pub fn word_count(text: &str) -> u32 {
    let body = FRONTMATTER_RE.replace(text, "");
    u32::try_from(WORD_RE.find_iter(&body).count()).unwrap_or(u32::MAX)
}

pub fn open_task_count(text: &str) -> u32 {
    u32::try_from(OPEN_TASK_RE.find_iter(text).count()).unwrap_or(u32::MAX)
}

fn word_dots(words: u32, words_per_dot: u32) -> u32 {
    if words_per_dot == 0 {
        return 0;
    }
    (words / words_per_dot).clamp(1, MAX_WORD_DOTS)
}

/// Collects every indicator for `period` using the host's index and vault.
pub async fn collect<H: Host>(
    host: &H,
    settings: &Settings,
    period: &Period,
) -> Vec<(IndicatorKind, IndicatorMetadata)> {
    if !settings.enable_dot_counters {
        return IndicatorKind::ALL
            .iter()
            .map(|kind| (*kind, IndicatorMetadata::empty()))
            .collect();
    }

    let content = match host.index().lookup(period) {
        Some(file) => match host.vault().read_file(file.path()).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(
                    "event=indicator_read module=indicators status=skip path={} error={}",
                    file.path(),
                    err
                );
                None
            }
        },
        None => None,
    };

    IndicatorKind::ALL
        .iter()
        .map(|kind| (*kind, metadata(*kind, settings, content.as_deref())))
        .collect()
}
