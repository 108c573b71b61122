//! External collaborators behind narrow traits, plus the two pieces of real
//! decision logic in the system.
//!
//! - [`SourceAdapter`] - fetches today's prayer schedule from a mosque
//!   website or a published spreadsheet export
//! - [`CalendarApi`] - the calendar service surface (Google Calendar v3)
//! - [`CalendarDirectory`] - resolves a display name to a calendar,
//!   creating and sharing one when absent
//! - [`Reconciler`] - makes the calendar's event set match a freshly
//!   fetched schedule under an explicit [`ReconcilePolicy`]
//! - [`CredentialProvider`] - exchanges a project id for a calendar-scoped
//!   access token via Secret Manager
//!
//! Everything is sequential: one blocking-style await at a time, pagination
//! followed to exhaustion, no retries. A failure anywhere aborts the run.

pub mod calendar;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod google;
pub mod reconcile;
pub mod source;

#[cfg(test)]
pub(crate) mod fake;

pub use calendar::{AclRole, AclScope, BoxFuture, CalendarApi, CalendarRef, EventDraft, EventQuery, EventRecord};
pub use credentials::CredentialProvider;
pub use directory::CalendarDirectory;
pub use error::{SyncError, SyncResult};
pub use google::{AccessToken, GoogleCalendarClient, SecretManagerClient, ServiceAccountKey};
pub use reconcile::{ClearScope, Outcome, ReconcilePolicy, Reconciler};
pub use source::{SourceAdapter, SourceKind};
