//! The prayer vocabulary and the per-day schedule extracted from a source.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;

/// The daily prayers (and sunrise) a source may publish.
///
/// Sources spell these with varying capitalization and the occasional
/// transliteration variant; [`PrayerName::from_label`] folds those onto the
/// canonical names used as event summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Shurooq,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// All prayers in day order.
    pub const ALL: [PrayerName; 6] = [
        PrayerName::Fajr,
        PrayerName::Shurooq,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    /// The canonical capitalized name, used verbatim as the event summary.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Shurooq => "Shurooq",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }

    /// Maps a scraped label onto the vocabulary, case-insensitively.
    ///
    /// Returns `None` for labels outside the vocabulary (e.g. a Jumu'ah row
    /// on a Friday listing); callers decide whether to skip or fail.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "fajr" => Some(PrayerName::Fajr),
            "shurooq" | "shuruq" | "sunrise" => Some(PrayerName::Shurooq),
            "dhuhr" | "zuhr" | "duhr" => Some(PrayerName::Dhuhr),
            "asr" => Some(PrayerName::Asr),
            "maghrib" => Some(PrayerName::Maghrib),
            "isha" | "ishaa" => Some(PrayerName::Isha),
            _ => None,
        }
    }
}

impl fmt::Display for PrayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from assembling a [`Schedule`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The same prayer appeared twice in one source fetch.
    #[error("duplicate prayer entry: {0}")]
    Duplicate(PrayerName),
}

/// One day's prayer-name → time mapping from a single source fetch.
///
/// Entries keep the order the source listed them in. Names are unique within
/// a schedule; a second insert of the same prayer is a format error at the
/// source, not something to silently overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<(PrayerName, Clock)>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, rejecting duplicate prayer names.
    pub fn insert(&mut self, prayer: PrayerName, time: Clock) -> Result<(), ScheduleError> {
        if self.get(prayer).is_some() {
            return Err(ScheduleError::Duplicate(prayer));
        }
        self.entries.push((prayer, time));
        Ok(())
    }

    /// Looks up the time for a prayer, if present.
    pub fn get(&self, prayer: PrayerName) -> Option<Clock> {
        self.entries.iter().find(|(p, _)| *p == prayer).map(|(_, t)| *t)
    }

    /// Iterates entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, Clock)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = (PrayerName, Clock);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (PrayerName, Clock)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}
