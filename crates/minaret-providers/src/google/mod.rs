//! Google service clients.
//!
//! Three small REST clients, all authenticated with service-account tokens:
//!
//! - [`auth`] - parses a service-account key and exchanges a signed JWT
//!   assertion for an access token
//! - [`secret`] - Secret Manager access (list secrets, read the latest
//!   version of one)
//! - [`client`] - the Calendar API v3 client implementing
//!   [`CalendarApi`](crate::calendar::CalendarApi)

pub mod auth;
pub mod client;
pub mod secret;

pub use auth::{AccessToken, ServiceAccountKey, CALENDAR_SCOPE, CLOUD_PLATFORM_SCOPE};
pub use client::GoogleCalendarClient;
pub use secret::SecretManagerClient;
