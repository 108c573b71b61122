//! In-memory [`CalendarApi`] for directory and reconciler tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::calendar::{
    AclRole, AclScope, BoxFuture, CalendarApi, CalendarRef, EventDraft, EventQuery, EventRecord,
};
use crate::error::SyncResult;

/// A stored event with its local start preserved for assertions.
#[derive(Debug, Clone)]
pub(crate) struct FakeEvent {
    pub id: String,
    pub calendar_id: String,
    pub summary: String,
    pub start: NaiveDateTime,
    pub time_zone: String,
}

impl FakeEvent {
    fn start_utc(&self) -> chrono::DateTime<Utc> {
        let tz: Tz = self.time_zone.parse().expect("valid test timezone");
        tz.from_local_datetime(&self.start)
            .earliest()
            .expect("unambiguous test time")
            .with_timezone(&Utc)
    }
}

/// In-memory calendar service.
#[derive(Debug, Default)]
pub(crate) struct FakeCalendarApi {
    pub calendars: Mutex<Vec<CalendarRef>>,
    pub acl: Mutex<Vec<(String, AclRole, AclScope)>>,
    pub events: Mutex<Vec<FakeEvent>>,
    counter: AtomicUsize,
}

impl FakeCalendarApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.counter.fetch_add(1, Ordering::Relaxed))
    }

    pub fn seed_calendar(&self, id: &str, summary: &str) {
        self.calendars
            .lock()
            .unwrap()
            .push(CalendarRef::new(id, summary));
    }

    pub fn seed_event(&self, calendar_id: &str, summary: &str, start: NaiveDateTime, tz: &str) {
        let id = self.next_id("seeded");
        self.events.lock().unwrap().push(FakeEvent {
            id,
            calendar_id: calendar_id.to_string(),
            summary: summary.to_string(),
            start,
            time_zone: tz.to_string(),
        });
    }
}

impl CalendarApi for FakeCalendarApi {
    fn list_calendars<'a>(&'a self) -> BoxFuture<'a, SyncResult<Vec<CalendarRef>>> {
        Box::pin(async move { Ok(self.calendars.lock().unwrap().clone()) })
    }

    fn insert_calendar<'a>(
        &'a self,
        summary: &'a str,
        _time_zone: &'a str,
    ) -> BoxFuture<'a, SyncResult<CalendarRef>> {
        Box::pin(async move {
            let calendar = CalendarRef::new(self.next_id("cal"), summary);
            self.calendars.lock().unwrap().push(calendar.clone());
            Ok(calendar)
        })
    }

    fn rename_calendar<'a>(
        &'a self,
        calendar_id: &'a str,
        summary: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            let mut calendars = self.calendars.lock().unwrap();
            if let Some(calendar) = calendars.iter_mut().find(|c| c.id == calendar_id) {
                calendar.summary = summary.to_string();
            }
            Ok(())
        })
    }

    fn insert_acl<'a>(
        &'a self,
        calendar_id: &'a str,
        role: AclRole,
        scope: &'a AclScope,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.acl
                .lock()
                .unwrap()
                .push((calendar_id.to_string(), role, scope.clone()));
            Ok(())
        })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        query: &'a EventQuery,
    ) -> BoxFuture<'a, SyncResult<Vec<EventRecord>>> {
        Box::pin(async move {
            let events = self.events.lock().unwrap();
            let records = events
                .iter()
                .filter(|e| e.calendar_id == calendar_id)
                .filter(|e| {
                    query
                        .window
                        .as_ref()
                        .is_none_or(|w| w.contains(e.start_utc()))
                })
                .filter(|e| {
                    query
                        .text
                        .as_ref()
                        .is_none_or(|t| e.summary.contains(t.as_str()))
                })
                .map(|e| EventRecord {
                    id: e.id.clone(),
                    summary: e.summary.clone(),
                    start: Some(e.start_utc()),
                    html_link: None,
                })
                .collect();
            Ok(records)
        })
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        draft: &'a EventDraft,
    ) -> BoxFuture<'a, SyncResult<EventRecord>> {
        Box::pin(async move {
            let event = FakeEvent {
                id: self.next_id("event"),
                calendar_id: calendar_id.to_string(),
                summary: draft.summary.clone(),
                start: draft.start,
                time_zone: draft.time_zone.clone(),
            };
            let record = EventRecord {
                id: event.id.clone(),
                summary: event.summary.clone(),
                start: Some(event.start_utc()),
                html_link: Some(format!("https://calendar.example/{}", event.id)),
            };
            self.events.lock().unwrap().push(event);
            Ok(record)
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            self.events
                .lock()
                .unwrap()
                .retain(|e| !(e.calendar_id == calendar_id && e.id == event_id));
            Ok(())
        })
    }
}
