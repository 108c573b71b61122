//! The one-day query window used to scope calendar reads and deletes.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A half-open UTC interval `[start, end)` covering one civil day.
///
/// Built from local midnight to the next local midnight in the calendar's
/// timezone, so "today" means today where the mosque is, not today in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive).
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Creates the window for `date` in the given timezone.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        let next = date.succ_opt().expect("valid successor date");
        Self {
            start: local_midnight_utc(date, tz),
            end: local_midnight_utc(next, tz),
        }
    }

    /// Checks whether an instant falls within the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The lower bound as a UTC-suffixed RFC 3339 string (`timeMin`).
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// The upper bound as a UTC-suffixed RFC 3339 string (`timeMax`).
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Resolves local midnight on `date` to UTC.
///
/// When a DST transition makes midnight ambiguous the earlier reading wins;
/// when a transition skips midnight entirely the naive reading is taken as
/// UTC, which keeps the window well-formed.
fn local_midnight_utc<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).expect("valid time");
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
