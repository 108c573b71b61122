//! Prayer-time sources.
//!
//! A [`SourceAdapter`] turns one mosque's published listing into today's
//! [`Schedule`]. Every call re-fetches over the network; nothing is cached.
//! Which adapter runs is a configuration choice, not a separate script.

use std::str::FromStr;
use std::time::Duration;

use minaret_core::Schedule;

use crate::calendar::BoxFuture;
use crate::error::{SyncError, SyncResult};

pub mod mosque_site;
pub mod sheet;

pub use mosque_site::MosqueSiteSource;
pub use sheet::SheetSource;

/// Homepage carrying the Leeds Grand Mosque daily listing.
pub const LEEDS_GRAND_MOSQUE_URL: &str = "https://www.leedsgrandmosque.com/";

/// A source of one mosque's daily prayer times.
pub trait SourceAdapter: Send + Sync {
    /// A short name for log and console lines.
    fn name(&self) -> &str;

    /// Fetches and extracts today's schedule.
    ///
    /// # Errors
    ///
    /// `SourceUnavailable` when the request does not succeed;
    /// `SourceFormatChanged` when the expected structural markers are absent
    /// or a time value cannot be parsed. No retry: the caller decides
    /// whether to abort the run.
    fn fetch_today<'a>(&'a self) -> BoxFuture<'a, SyncResult<Schedule>>;
}

/// Which source to scrape, selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A mosque homepage with a prayers-list container.
    MosqueSite { url: String },
    /// A published-spreadsheet CSV export.
    Sheet { url: String },
}

impl SourceKind {
    /// The default source: the Leeds Grand Mosque homepage.
    pub fn leeds_grand_mosque() -> Self {
        Self::MosqueSite {
            url: LEEDS_GRAND_MOSQUE_URL.to_string(),
        }
    }

    /// Builds the adapter for this source.
    pub fn build(&self, timeout: Duration) -> Box<dyn SourceAdapter> {
        match self {
            Self::MosqueSite { url } => Box::new(MosqueSiteSource::new(url.clone(), timeout)),
            Self::Sheet { url } => Box::new(SheetSource::new(url.clone(), timeout)),
        }
    }
}

impl FromStr for SourceKind {
    type Err = SyncError;

    /// Parses a source selector: `leeds`, `html:<url>` or `sheet:<url>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("leeds") {
            return Ok(Self::leeds_grand_mosque());
        }
        if let Some(url) = s.strip_prefix("html:") {
            return Ok(Self::MosqueSite {
                url: url.to_string(),
            });
        }
        if let Some(url) = s.strip_prefix("sheet:") {
            return Ok(Self::Sheet {
                url: url.to_string(),
            });
        }
        Err(SyncError::config(format!(
            "unrecognized source {:?} (expected \"leeds\", \"html:<url>\" or \"sheet:<url>\")",
            s
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_source_selectors() {
        assert_eq!("leeds".parse::<SourceKind>().unwrap(), SourceKind::leeds_grand_mosque());
        assert_eq!(
            "html:https://example.org/".parse::<SourceKind>().unwrap(),
            SourceKind::MosqueSite {
                url: "https://example.org/".to_string()
            }
        );
        assert_eq!(
            "sheet:https://example.org/pub?output=csv"
                .parse::<SourceKind>()
                .unwrap(),
            SourceKind::Sheet {
                url: "https://example.org/pub?output=csv".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_selector() {
        let err = "ftp://example.org".parse::<SourceKind>().unwrap_err();
        assert!(matches!(err, SyncError::Config { .. }));
    }
}
