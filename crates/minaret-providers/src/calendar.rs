//! The calendar service surface.
//!
//! [`CalendarApi`] is the narrow interface the directory and reconciler work
//! against. The production implementation is
//! [`GoogleCalendarClient`](crate::google::GoogleCalendarClient); tests use
//! an in-memory fake.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use minaret_core::DayWindow;

use crate::error::SyncResult;

/// A boxed future for async trait methods.
///
/// Boxing keeps the trait object-safe so callers can hold a
/// `&dyn CalendarApi`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An opaque calendar identifier plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRef {
    /// The service-assigned calendar id.
    pub id: String,
    /// The human-readable display name.
    pub summary: String,
}

impl CalendarRef {
    /// Creates a calendar reference.
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: summary.into(),
        }
    }
}

/// A zero-duration event to be created.
///
/// `start` is a naive local datetime; the service interprets it in
/// `time_zone`. The end instant is always identical to the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Event summary (the canonical prayer name).
    pub summary: String,
    /// The point in time, in local civil time.
    pub start: NaiveDateTime,
    /// IANA timezone the start is expressed in.
    pub time_zone: String,
}

/// An event as returned by the calendar service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// The service-assigned event id.
    pub id: String,
    /// Event summary.
    pub summary: String,
    /// Start instant, when the service reported one.
    pub start: Option<DateTime<Utc>>,
    /// Browser link to the event, when reported.
    pub html_link: Option<String>,
}

/// Role granted by an ACL entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclRole {
    Reader,
    Writer,
}

impl AclRole {
    /// The wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            AclRole::Reader => "reader",
            AclRole::Writer => "writer",
        }
    }
}

/// Principal an ACL entry applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclScope {
    /// Anyone with the link.
    Public,
    /// A specific account.
    User(String),
}

/// Filters for an event listing.
///
/// `window` bounds the listing to instants within `[start, end)`; `text` is
/// the service's free-text search, which matches substrings and is not an
/// exact-summary filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Restrict to events starting within this window.
    pub window: Option<DayWindow>,
    /// Free-text search term.
    pub text: Option<String>,
}

impl EventQuery {
    /// An unfiltered listing.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the listing to a day window.
    pub fn within(window: DayWindow) -> Self {
        Self {
            window: Some(window),
            text: None,
        }
    }

    /// Adds a free-text search term.
    pub fn matching(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// The calendar operations the sync needs.
///
/// Every method is one synchronous request/response exchange from the
/// caller's point of view; `list_events` follows continuation tokens to
/// exhaustion before returning.
pub trait CalendarApi: Send + Sync {
    /// Lists all calendars visible to the current credential.
    fn list_calendars<'a>(&'a self) -> BoxFuture<'a, SyncResult<Vec<CalendarRef>>>;

    /// Creates a calendar with the given display name and timezone.
    fn insert_calendar<'a>(
        &'a self,
        summary: &'a str,
        time_zone: &'a str,
    ) -> BoxFuture<'a, SyncResult<CalendarRef>>;

    /// Changes a calendar's display name.
    fn rename_calendar<'a>(
        &'a self,
        calendar_id: &'a str,
        summary: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>>;

    /// Grants a role on a calendar. Irreversible remote mutation.
    fn insert_acl<'a>(
        &'a self,
        calendar_id: &'a str,
        role: AclRole,
        scope: &'a AclScope,
    ) -> BoxFuture<'a, SyncResult<()>>;

    /// Lists events matching the query, following pagination to the end.
    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        query: &'a EventQuery,
    ) -> BoxFuture<'a, SyncResult<Vec<EventRecord>>>;

    /// Creates an event.
    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        draft: &'a EventDraft,
    ) -> BoxFuture<'a, SyncResult<EventRecord>>;

    /// Deletes an event.
    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn acl_role_wire_names() {
        assert_eq!(AclRole::Reader.as_str(), "reader");
        assert_eq!(AclRole::Writer.as_str(), "writer");
    }

    #[test]
    fn query_builders() {
        let tz: Tz = "Europe/London".parse().unwrap();
        let window =
            DayWindow::for_date(chrono::NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(), &tz);

        let all = EventQuery::all();
        assert!(all.window.is_none());
        assert!(all.text.is_none());

        let filtered = EventQuery::within(window.clone()).matching("Fajr");
        assert_eq!(filtered.window, Some(window));
        assert_eq!(filtered.text.as_deref(), Some("Fajr"));
    }
}
