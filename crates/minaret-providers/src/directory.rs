//! Calendar directory: display name → calendar, creating when absent.

use tracing::{debug, info, warn};

use crate::calendar::{AclRole, AclScope, CalendarApi, CalendarRef};
use crate::error::SyncResult;

/// Resolves display names against the calendars the credential can see.
pub struct CalendarDirectory<'a> {
    api: &'a dyn CalendarApi,
}

impl<'a> CalendarDirectory<'a> {
    /// Creates a directory over the given calendar service.
    pub fn new(api: &'a dyn CalendarApi) -> Self {
        Self { api }
    }

    /// Resolves `name` to a calendar, creating one when absent.
    ///
    /// Lookup prefers an exact summary match. A substring match is accepted
    /// as a fallback (first match wins among several - an accepted
    /// imprecision, logged so it is visible). When nothing matches, a new
    /// calendar is created with the given timezone and granted a single
    /// public-reader ACL entry, so anyone with the link can view it.
    ///
    /// Creation and the ACL grant are irreversible remote mutations with no
    /// rollback if a later step of the run fails.
    pub async fn resolve(&self, name: &str, time_zone: &str) -> SyncResult<CalendarRef> {
        let calendars = self.api.list_calendars().await?;

        if let Some(found) = calendars.iter().find(|c| c.summary == name) {
            debug!(calendar = %found.id, name, "resolved by exact name");
            return Ok(found.clone());
        }

        if let Some(found) = calendars.iter().find(|c| c.summary.contains(name)) {
            warn!(
                calendar = %found.id,
                summary = %found.summary,
                name,
                "resolved by substring match; first match wins"
            );
            return Ok(found.clone());
        }

        let created = self.api.insert_calendar(name, time_zone).await?;
        self.api
            .insert_acl(&created.id, AclRole::Reader, &AclScope::Public)
            .await?;
        info!(calendar = %created.id, name, "created public calendar");
        Ok(created)
    }

    /// Grants `role` on the calendar to a specific account.
    pub async fn share(
        &self,
        calendar: &CalendarRef,
        email: &str,
        role: AclRole,
    ) -> SyncResult<()> {
        self.api
            .insert_acl(&calendar.id, role, &AclScope::User(email.to_string()))
            .await?;
        info!(calendar = %calendar.id, email, role = role.as_str(), "shared calendar");
        Ok(())
    }

    /// Changes a calendar's display name.
    pub async fn rename(&self, calendar: &CalendarRef, name: &str) -> SyncResult<()> {
        self.api.rename_calendar(&calendar.id, name).await?;
        info!(calendar = %calendar.id, name, "renamed calendar");
        Ok(())
    }
}
