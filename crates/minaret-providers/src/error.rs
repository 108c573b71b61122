//! The sync error taxonomy.
//!
//! None of these are recovered locally: any failure aborts the whole run and
//! surfaces at the process boundary. There is no retry logic and no
//! compensating action when a later step fails after an earlier mutation.

use thiserror::Error;

use minaret_core::{ClockParseError, ScheduleError};

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The source could not be reached or did not answer successfully.
    #[error("source unavailable: {message}")]
    SourceUnavailable { message: String },

    /// The source answered but its structure no longer matches what the
    /// adapter expects (missing container, unknown rows, unparseable time).
    #[error("source format changed: {message}")]
    SourceFormatChanged { message: String },

    /// No usable credential could be obtained.
    #[error("credential unavailable: {message}")]
    CredentialUnavailable { message: String },

    /// Calendar lookup/creation/sharing failed.
    #[error("calendar directory unavailable: {message}")]
    DirectoryUnavailable { message: String },

    /// An event list/insert/delete call failed.
    #[error("event operation failed: {message}")]
    EventOperation { message: String },

    /// A run parameter is missing or malformed.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl SyncError {
    /// Creates a source-unavailable error.
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a source-format-changed error.
    pub fn source_format(message: impl Into<String>) -> Self {
        Self::SourceFormatChanged {
            message: message.into(),
        }
    }

    /// Creates a credential-unavailable error.
    pub fn credential(message: impl Into<String>) -> Self {
        Self::CredentialUnavailable {
            message: message.into(),
        }
    }

    /// Creates a directory-unavailable error.
    pub fn directory(message: impl Into<String>) -> Self {
        Self::DirectoryUnavailable {
            message: message.into(),
        }
    }

    /// Creates an event-operation error.
    pub fn event(message: impl Into<String>) -> Self {
        Self::EventOperation {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<ScheduleError> for SyncError {
    fn from(err: ScheduleError) -> Self {
        Self::source_format(err.to_string())
    }
}

impl From<ClockParseError> for SyncError {
    fn from(err: ClockParseError) -> Self {
        Self::source_format(err.to_string())
    }
}
