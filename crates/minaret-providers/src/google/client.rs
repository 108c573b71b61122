//! Google Calendar API client.
//!
//! A low-level HTTP client for the Calendar API v3 implementing
//! [`CalendarApi`]: calendar listing/creation/patching, ACL grants, and
//! paginated event listing plus event insert/delete.

use std::time::Duration;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::{
    AclRole, AclScope, BoxFuture, CalendarApi, CalendarRef, EventDraft, EventQuery, EventRecord,
};
use crate::error::{SyncError, SyncResult};

use super::auth::http_client;

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Which error-taxonomy bucket a failed call lands in.
#[derive(Debug, Clone, Copy)]
enum Surface {
    Directory,
    Event,
}

impl Surface {
    fn wrap(self, message: String) -> SyncError {
        match self {
            Surface::Directory => SyncError::directory(message),
            Surface::Event => SyncError::event(message),
        }
    }
}

/// Google Calendar API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
}

impl GoogleCalendarClient {
    /// Creates a client with the given access token.
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: http_client(timeout),
            access_token: access_token.into(),
        }
    }

    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
        surface: Surface,
    ) -> SyncResult<String> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                surface.wrap("request timeout".to_string())
            } else if e.is_connect() {
                surface.wrap(format!("connection failed: {}", e))
            } else {
                surface.wrap(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(surface.wrap("access token expired or invalid".to_string()));
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(surface.wrap("access denied to calendar".to_string()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            return Err(surface.wrap(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| surface.wrap(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(surface.wrap(format!("API error ({}): {}", status, body)));
        }

        Ok(body)
    }

    /// Fetches a single page of events.
    async fn list_events_page(
        &self,
        calendar_id: &str,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> SyncResult<EventListResponse> {
        let url = format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(calendar_id)
        );

        let mut request = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("singleEvents", "true")]);

        if let Some(ref window) = query.window {
            request = request.query(&[
                ("timeMin", window.time_min()),
                ("timeMax", window.time_max()),
            ]);
        }
        if let Some(ref text) = query.text {
            request = request.query(&[("q", text)]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let body = self.send_checked(request, Surface::Event).await?;

        serde_json::from_str(&body)
            .map_err(|e| SyncError::event(format!("failed to parse event listing: {}", e)))
    }

    /// Converts an API event to an [`EventRecord`].
    fn convert_event(&self, event: ApiEvent) -> Option<EventRecord> {
        if event.status.as_deref() == Some("cancelled") {
            return None;
        }

        let id = event.id?;

        // All-day events carry only a date; they are listed (and deletable)
        // but have no start instant here.
        let start = event.start.and_then(|s| s.date_time).and_then(|dt| {
            DateTime::parse_from_rfc3339(&dt)
                .map_err(|e| warn!("failed to parse event start: {}", e))
                .ok()
                .map(|parsed| parsed.to_utc())
        });

        Some(EventRecord {
            id,
            summary: event.summary.unwrap_or_default(),
            start,
            html_link: event.html_link,
        })
    }
}

impl CalendarApi for GoogleCalendarClient {
    fn list_calendars<'a>(&'a self) -> BoxFuture<'a, SyncResult<Vec<CalendarRef>>> {
        Box::pin(async move {
            let url = format!("{}/users/me/calendarList", CALENDAR_API_BASE);
            let mut calendars = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut request = self.http_client.get(&url).bearer_auth(&self.access_token);
                if let Some(ref token) = page_token {
                    request = request.query(&[("pageToken", token)]);
                }

                let body = self.send_checked(request, Surface::Directory).await?;
                let page: CalendarListResponse = serde_json::from_str(&body).map_err(|e| {
                    SyncError::directory(format!("failed to parse calendar listing: {}", e))
                })?;

                calendars.extend(
                    page.items
                        .into_iter()
                        .map(|c| CalendarRef::new(c.id, c.summary.unwrap_or_default())),
                );

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }

            debug!(count = calendars.len(), "listed calendars");
            Ok(calendars)
        })
    }

    fn insert_calendar<'a>(
        &'a self,
        summary: &'a str,
        time_zone: &'a str,
    ) -> BoxFuture<'a, SyncResult<CalendarRef>> {
        Box::pin(async move {
            let url = format!("{}/calendars", CALENDAR_API_BASE);
            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(&CalendarBody {
                    summary,
                    time_zone: Some(time_zone),
                });

            let body = self.send_checked(request, Surface::Directory).await?;
            let created: ApiCalendar = serde_json::from_str(&body).map_err(|e| {
                SyncError::directory(format!("failed to parse created calendar: {}", e))
            })?;

            Ok(CalendarRef::new(
                created.id,
                created.summary.unwrap_or_else(|| summary.to_string()),
            ))
        })
    }

    fn rename_calendar<'a>(
        &'a self,
        calendar_id: &'a str,
        summary: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            let url = format!(
                "{}/calendars/{}",
                CALENDAR_API_BASE,
                urlencoding::encode(calendar_id)
            );
            let request = self
                .http_client
                .patch(&url)
                .bearer_auth(&self.access_token)
                .json(&CalendarBody {
                    summary,
                    time_zone: None,
                });

            self.send_checked(request, Surface::Directory).await?;
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
            let url = format!(
                "{}/calendars/{}/acl",
                CALENDAR_API_BASE,
                urlencoding::encode(calendar_id)
            );

            let scope_body = match scope {
                AclScope::Public => AclScopeBody {
                    scope_type: "default",
                    value: None,
                },
                AclScope::User(email) => AclScopeBody {
                    scope_type: "user",
                    value: Some(email),
                },
            };

            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(&AclBody {
                    role: role.as_str(),
                    scope: scope_body,
                });

            self.send_checked(request, Surface::Directory).await?;
            Ok(())
        })
    }

    fn list_events<'a>(
        &'a self,
        calendar_id: &'a str,
        query: &'a EventQuery,
    ) -> BoxFuture<'a, SyncResult<Vec<EventRecord>>> {
        Box::pin(async move {
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let page = self
                    .list_events_page(calendar_id, query, page_token.as_deref())
                    .await?;

                events.extend(page.items.into_iter().filter_map(|e| self.convert_event(e)));

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }

            debug!(count = events.len(), calendar = calendar_id, "listed events");
            Ok(events)
        })
    }

    fn insert_event<'a>(
        &'a self,
        calendar_id: &'a str,
        draft: &'a EventDraft,
    ) -> BoxFuture<'a, SyncResult<EventRecord>> {
        Box::pin(async move {
            let url = format!(
                "{}/calendars/{}/events",
                CALENDAR_API_BASE,
                urlencoding::encode(calendar_id)
            );

            // Zero-duration event: end is the same local instant as start.
            let instant = EventTimeBody {
                date_time: draft.start.format("%Y-%m-%dT%H:%M:%S").to_string(),
                time_zone: &draft.time_zone,
            };
            let event_body = EventBody {
                summary: &draft.summary,
                start: instant.clone(),
                end: instant,
            };

            let request = self
                .http_client
                .post(&url)
                .bearer_auth(&self.access_token)
                .json(&event_body);

            let body = self.send_checked(request, Surface::Event).await?;
            let created: ApiEvent = serde_json::from_str(&body)
                .map_err(|e| SyncError::event(format!("failed to parse created event: {}", e)))?;

            self.convert_event(created)
                .ok_or_else(|| SyncError::event("created event came back without an id"))
        })
    }

    fn delete_event<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, SyncResult<()>> {
        Box::pin(async move {
            let url = format!(
                "{}/calendars/{}/events/{}",
                CALENDAR_API_BASE,
                urlencoding::encode(calendar_id),
                urlencoding::encode(event_id)
            );

            let request = self.http_client.delete(&url).bearer_auth(&self.access_token);
            self.send_checked(request, Surface::Event).await?;
            Ok(())
        })
    }
}

/// Request body for calendars.insert / calendars.patch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalendarBody<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_zone: Option<&'a str>,
}

/// Request body for acl.insert.
#[derive(Debug, Serialize)]
struct AclBody<'a> {
    role: &'a str,
    scope: AclScopeBody<'a>,
}

#[derive(Debug, Serialize)]
struct AclScopeBody<'a> {
    #[serde(rename = "type")]
    scope_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
}

/// Request body for events.insert.
#[derive(Debug, Serialize)]
struct EventBody<'a> {
    summary: &'a str,
    start: EventTimeBody<'a>,
    end: EventTimeBody<'a>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTimeBody<'a> {
    date_time: String,
    time_zone: &'a str,
}

/// Response from the calendarList endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<ApiCalendar>,
    next_page_token: Option<String>,
}

/// A calendar from the listing or a creation response.
#[derive(Debug, Deserialize)]
struct ApiCalendar {
    id: String,
    summary: Option<String>,
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    start: Option<ApiEventTime>,
    html_link: Option<String>,
    status: Option<String>,
}

/// Event time from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date_time: Option<String>,
}
