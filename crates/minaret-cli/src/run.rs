//! One sync run: credentials → directory → source → reconciler.

use std::time::Duration;

use chrono::Utc;
use tracing::info;

use minaret_providers::{
    AclRole, CalendarDirectory, CalendarRef, CredentialProvider, GoogleCalendarClient, Outcome,
    Reconciler, SyncResult,
};

use crate::config::Config;

/// Timeout applied to every outbound request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes the whole run, aborting on the first failure.
pub async fn run(config: Config) -> SyncResult<()> {
    let bootstrap = config.bootstrap.load()?;
    let provider = CredentialProvider::new(bootstrap, REQUEST_TIMEOUT);
    let token = provider
        .calendar_token(&config.project_id, config.secret_name.as_deref())
        .await?;
    let api = GoogleCalendarClient::new(token.token, REQUEST_TIMEOUT);

    let source = config.source.build(REQUEST_TIMEOUT);
    let schedule = source.fetch_today().await?;
    println!(
        "Fetched {} prayer times from {}",
        schedule.len(),
        source.name()
    );
    for (prayer, time) in &schedule {
        println!("  {} {}", prayer, time);
    }

    let today = Utc::now().with_timezone(&config.timezone).date_naive();
    info!(%today, timezone = config.timezone.name(), "syncing");

    let directory = CalendarDirectory::new(&api);
    let reconciler = Reconciler::new(&api);

    for calendar in resolve_targets(&config, &directory).await? {
        let outcomes = reconciler
            .reconcile(&calendar, &schedule, today, config.timezone, config.policy)
            .await?;
        report(&calendar, &outcomes);
    }

    Ok(())
}

/// Resolves the calendars to sync onto.
///
/// A configured `CALENDAR_ID` is taken as-is; otherwise each configured
/// display name is resolved (creating and sharing where needed).
async fn resolve_targets(
    config: &Config,
    directory: &CalendarDirectory<'_>,
) -> SyncResult<Vec<CalendarRef>> {
    if let Some(ref id) = config.calendar_id {
        return Ok(vec![CalendarRef::new(id.clone(), id.clone())]);
    }

    let mut targets = Vec::new();
    for name in &config.calendar_names {
        let calendar = directory.resolve(name, config.timezone.name()).await?;
        if let Some(ref email) = config.email {
            directory.share(&calendar, email, AclRole::Writer).await?;
            println!("Calendar {:?} is shared with {}", calendar.summary, email);
        }
        targets.push(calendar);
    }
    Ok(targets)
}

/// Prints the per-event status lines and the subscribe link.
fn report(calendar: &CalendarRef, outcomes: &[Outcome]) {
    for outcome in outcomes {
        match outcome {
            Outcome::Created {
                prayer,
                start,
                html_link,
            } => match html_link {
                Some(link) => println!("Created {} at {}: {}", prayer, start.format("%H:%M"), link),
                None => println!("Created {} at {}", prayer, start.format("%H:%M")),
            },
            Outcome::Skipped { prayer } => {
                println!("Skipped {}: already on the calendar", prayer);
            }
            Outcome::Deleted { event_id, summary } => {
                println!("Deleted {} ({})", summary, event_id);
            }
        }
    }
    println!(
        "Subscribe: https://calendar.google.com/calendar/u/0/r?cid={}",
        calendar.id
    );
}
