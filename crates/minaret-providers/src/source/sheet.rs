//! Published-spreadsheet source.
//!
//! Some mosques publish their daily times as a spreadsheet exported to
//! CSV-like text (one row per prayer, name in the first cell, time in the
//! second). Rows whose first cell is not a prayer label - headers, blank
//! separators, notes - are ignored.

use std::time::Duration;

use tracing::debug;

use minaret_core::{Clock, PrayerName, Schedule};

use crate::calendar::BoxFuture;
use crate::error::{SyncError, SyncResult};
use crate::google::auth::http_client;

use super::SourceAdapter;

/// Scrapes a published spreadsheet export for today's prayer times.
pub struct SheetSource {
    url: String,
    http_client: reqwest::Client,
}

impl SheetSource {
    /// Creates a source for the given export URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            http_client: http_client(timeout),
        }
    }
}

impl SourceAdapter for SheetSource {
    fn name(&self) -> &str {
        "sheet"
    }

    fn fetch_today<'a>(&'a self) -> BoxFuture<'a, SyncResult<Schedule>> {
        Box::pin(async move {
            let response = self
                .http_client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| SyncError::source_unavailable(format!("{}: {}", self.url, e)))?;

            let status = response.status();
            if !status.is_success() {
                return Err(SyncError::source_unavailable(format!(
                    "{} answered {}",
                    self.url, status
                )));
            }

            let body = response.text().await.map_err(|e| {
                SyncError::source_unavailable(format!("failed to read {}: {}", self.url, e))
            })?;

            parse_sheet(&body)
        })
    }
}

/// Extracts the schedule out of the exported rows.
pub(crate) fn parse_sheet(text: &str) -> SyncResult<Schedule> {
    let mut schedule = Schedule::new();

    for line in text.lines() {
        let mut cells = line.split(',').map(|c| c.trim().trim_matches('"'));
        let Some(label) = cells.next() else { continue };
        let Some(prayer) = PrayerName::from_label(label) else {
            if !label.is_empty() {
                debug!(label, "skipping non-prayer row");
            }
            continue;
        };

        let value = cells
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SyncError::source_format(format!("no time cell for {}", prayer)))?;
        let time = Clock::parse(value)
            .map_err(|e| SyncError::source_format(format!("time for {}: {}", prayer, e)))?;
        schedule.insert(prayer, time)?;
    }

    if schedule.is_empty() {
        return Err(SyncError::source_format("no prayer rows in the export"));
    }

    Ok(schedule)
}
