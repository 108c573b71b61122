//! Mosque-homepage source.
//!
//! The Leeds Grand Mosque homepage (and sites built on the same theme)
//! renders the daily listing as list items under a `prayers-list` container,
//! each item holding a `prayer-name` element and a `date` element with the
//! time. Extraction keys off those class markers; anything else on the page
//! is ignored.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use minaret_core::{Clock, PrayerName, Schedule};

use crate::calendar::BoxFuture;
use crate::error::{SyncError, SyncResult};
use crate::google::auth::http_client;

use super::SourceAdapter;

/// Marks the start of the prayers container.
static CONTAINER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="[^"]*\bprayers-list\b[^"]*""#).expect("invalid container regex")
});

/// One listing item: the `prayer-name` element text followed by the nearest
/// `date` element text.
static ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)class="[^"]*\bprayer-name\b[^"]*"[^>]*>\s*([^<]+?)\s*<.*?class="[^"]*\bdate\b[^"]*"[^>]*>\s*([^<]+?)\s*<"#,
    )
    .expect("invalid item regex")
});

/// Scrapes a mosque homepage for today's prayer times.
pub struct MosqueSiteSource {
    url: String,
    http_client: reqwest::Client,
}

impl MosqueSiteSource {
    /// Creates a source for the given homepage URL.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            http_client: http_client(timeout),
        }
    }
}

impl SourceAdapter for MosqueSiteSource {
    fn name(&self) -> &str {
        "mosque-site"
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

            parse_schedule(&body)
        })
    }
}

/// Extracts the schedule out of the homepage HTML.
pub(crate) fn parse_schedule(html: &str) -> SyncResult<Schedule> {
    let container = CONTAINER_REGEX
        .find(html)
        .ok_or_else(|| SyncError::source_format("prayers-list container not found"))?;

    let mut schedule = Schedule::new();
    for captures in ITEM_REGEX.captures_iter(&html[container.start()..]) {
        let label = &captures[1];
        let value = &captures[2];

        let Some(prayer) = PrayerName::from_label(label) else {
            debug!(label, "skipping unrecognized listing row");
            continue;
        };

        let time = Clock::parse(value).map_err(|e| {
            SyncError::source_format(format!("time for {}: {}", prayer, e))
        })?;
        schedule.insert(prayer, time)?;
    }

    if schedule.is_empty() {
        return Err(SyncError::source_format(
            "no prayer entries under the prayers-list container",
        ));
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div class="header">Leeds Grand Mosque</div>
        <ul class="prayers-list today">
          <li><span class="prayer-name">FAJR</span><span class="date">05:12</span></li>
          <li><span class="prayer-name">Sunrise</span><span class="date">07:40</span></li>
          <li><span class="prayer-name">dhuhr</span><span class="date">12:30</span></li>
          <li><span class="prayer-name">Asr</span><span class="date">03:45 PM</span></li>
          <li><span class="prayer-name">Maghrib</span><span class="date">05:50 PM</span></li>
          <li><span class="prayer-name">Isha</span><span class="date">07:20 PM</span></li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn extracts_all_entries_with_unique_names() {
        let schedule = parse_schedule(PAGE).unwrap();
        assert_eq!(schedule.len(), 6);

        assert_eq!(schedule.get(PrayerName::Fajr), Clock::new(5, 12));
        assert_eq!(schedule.get(PrayerName::Shurooq), Clock::new(7, 40));
        assert_eq!(schedule.get(PrayerName::Dhuhr), Clock::new(12, 30));
        assert_eq!(schedule.get(PrayerName::Asr), Clock::new(15, 45));
        assert_eq!(schedule.get(PrayerName::Maghrib), Clock::new(17, 50));
        assert_eq!(schedule.get(PrayerName::Isha), Clock::new(19, 20));
    }

    #[test]
    fn unrecognized_rows_are_skipped() {
        let page = r#"
            <ul class="prayers-list">
              <li><span class="prayer-name">Fajr</span><span class="date">05:12</span></li>
              <li><span class="prayer-name">Jumu'ah</span><span class="date">13:00</span></li>
            </ul>
        "#;
        let schedule = parse_schedule(page).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.get(PrayerName::Fajr), Clock::new(5, 12));
    }

    #[test]
    fn missing_container_is_a_format_error() {
        let err = parse_schedule("<html><body>nothing here</body></html>").unwrap_err();
        assert!(matches!(err, SyncError::SourceFormatChanged { .. }));
    }

    #[test]
    fn empty_container_is_a_format_error() {
        let err = parse_schedule(r#"<ul class="prayers-list"></ul>"#).unwrap_err();
        assert!(matches!(err, SyncError::SourceFormatChanged { .. }));
    }

    #[test]
    fn unparseable_time_is_a_format_error() {
        let page = r#"
            <ul class="prayers-list">
              <li><span class="prayer-name">Fajr</span><span class="date">soon</span></li>
            </ul>
        "#;
        let err = parse_schedule(page).unwrap_err();
        assert!(matches!(err, SyncError::SourceFormatChanged { .. }));
    }

    #[test]
    fn duplicate_prayer_is_a_format_error() {
        let page = r#"
            <ul class="prayers-list">
              <li><span class="prayer-name">Fajr</span><span class="date">05:12</span></li>
              <li><span class="prayer-name">Fajr</span><span class="date">05:13</span></li>
            </ul>
        "#;
        let err = parse_schedule(page).unwrap_err();
        assert!(matches!(err, SyncError::SourceFormatChanged { .. }));
    }

    #[test]
    fn markers_before_the_container_are_ignored() {
        let page = r#"
            <span class="prayer-name">Decoy</span><span class="date">01:00</span>
            <ul class="prayers-list">
              <li><span class="prayer-name">Isha</span><span class="date">19:20</span></li>
            </ul>
        "#;
        let schedule = parse_schedule(page).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.get(PrayerName::Isha), Clock::new(19, 20));
    }
}
