//! Event reconciliation: make the calendar's event set match a freshly
//! fetched schedule.
//!
//! The dedup behavior is an explicit [`ReconcilePolicy`], selected by
//! configuration rather than baked into which script ran:
//!
//! - [`ReconcilePolicy::ClearAndRecreate`] wipes listed events and rebuilds.
//!   Idempotent by construction, but destroys manually added events within
//!   its [`ClearScope`].
//! - [`ReconcilePolicy::SkipIfExists`] creates only prayers with no matching
//!   same-day event. Approximately idempotent: the match is the service's
//!   free-text search, which can hit substrings of unrelated events and can
//!   lag a just-created event.
//! - [`ReconcilePolicy::AppendAlways`] creates unconditionally.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use tracing::{debug, info};

use minaret_core::{Clock, DayWindow, PrayerName, Schedule};

use crate::calendar::{CalendarApi, CalendarRef, EventDraft, EventQuery};
use crate::error::{SyncError, SyncResult};

/// How much of the calendar `ClearAndRecreate` is allowed to wipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    /// Only events within today's window. The default.
    Day,
    /// Every event the listing returns, regardless of date.
    Everything,
}

/// Dedup policy for repeated daily runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Delete listed events, then create one event per schedule entry.
    ClearAndRecreate { scope: ClearScope },
    /// Create only prayers whose day window has no matching event.
    SkipIfExists,
    /// Create unconditionally, never deduplicating.
    AppendAlways,
}

impl ReconcilePolicy {
    /// The configuration name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClearAndRecreate {
                scope: ClearScope::Day,
            } => "clear",
            Self::ClearAndRecreate {
                scope: ClearScope::Everything,
            } => "clear-all",
            Self::SkipIfExists => "skip-if-exists",
            Self::AppendAlways => "append",
        }
    }
}

impl fmt::Display for ReconcilePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReconcilePolicy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clear" => Ok(Self::ClearAndRecreate {
                scope: ClearScope::Day,
            }),
            "clear-all" => Ok(Self::ClearAndRecreate {
                scope: ClearScope::Everything,
            }),
            "skip-if-exists" | "skip" => Ok(Self::SkipIfExists),
            "append" => Ok(Self::AppendAlways),
            other => Err(SyncError::config(format!(
                "unrecognized sync policy {:?} (expected clear, clear-all, skip-if-exists or append)",
                other
            ))),
        }
    }
}

/// What happened to one event during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An event was created for this prayer.
    Created {
        prayer: PrayerName,
        start: NaiveDateTime,
        html_link: Option<String>,
    },
    /// A matching same-day event already existed.
    Skipped { prayer: PrayerName },
    /// A pre-existing event was deleted.
    Deleted { event_id: String, summary: String },
}

/// Ensures each prayer has exactly one same-day event at the correct time.
pub struct Reconciler<'a> {
    api: &'a dyn CalendarApi,
}

impl<'a> Reconciler<'a> {
    /// Creates a reconciler over the given calendar service.
    pub fn new(api: &'a dyn CalendarApi) -> Self {
        Self { api }
    }

    /// Reconciles `schedule` onto the calendar for `date` under `policy`.
    ///
    /// Operations run strictly in order; there is no compensation if a
    /// creation fails after deletions have already happened.
    pub async fn reconcile(
        &self,
        calendar: &CalendarRef,
        schedule: &Schedule,
        date: NaiveDate,
        tz: Tz,
        policy: ReconcilePolicy,
    ) -> SyncResult<Vec<Outcome>> {
        info!(
            calendar = %calendar.id,
            %date,
            policy = %policy,
            entries = schedule.len(),
            "reconciling schedule"
        );

        let window = DayWindow::for_date(date, &tz);
        let mut outcomes = Vec::new();

        match policy {
            ReconcilePolicy::ClearAndRecreate { scope } => {
                let query = match scope {
                    ClearScope::Day => EventQuery::within(window),
                    ClearScope::Everything => EventQuery::all(),
                };
                let existing = self.api.list_events(&calendar.id, &query).await?;
                for event in existing {
                    self.api.delete_event(&calendar.id, &event.id).await?;
                    outcomes.push(Outcome::Deleted {
                        event_id: event.id,
                        summary: event.summary,
                    });
                }
                for (prayer, time) in schedule {
                    outcomes.push(self.create(calendar, prayer, date, time, tz).await?);
                }
            }
            ReconcilePolicy::SkipIfExists => {
                for (prayer, time) in schedule {
                    let query =
                        EventQuery::within(window.clone()).matching(prayer.as_str());
                    let matches = self.api.list_events(&calendar.id, &query).await?;
                    if matches.is_empty() {
                        outcomes.push(self.create(calendar, prayer, date, time, tz).await?);
                    } else {
                        debug!(%prayer, "event already present, skipping");
                        outcomes.push(Outcome::Skipped { prayer });
                    }
                }
            }
            ReconcilePolicy::AppendAlways => {
                for (prayer, time) in schedule {
                    outcomes.push(self.create(calendar, prayer, date, time, tz).await?);
                }
            }
        }

        Ok(outcomes)
    }

    async fn create(
        &self,
        calendar: &CalendarRef,
        prayer: PrayerName,
        date: NaiveDate,
        time: Clock,
        tz: Tz,
    ) -> SyncResult<Outcome> {
        let start = date.and_time(time.to_naive_time());
        let draft = EventDraft {
            summary: prayer.as_str().to_string(),
            start,
            time_zone: tz.name().to_string(),
        };
        let created = self.api.insert_event(&calendar.id, &draft).await?;
        Ok(Outcome::Created {
            prayer,
            start,
            html_link: created.html_link,
        })
    }
}
