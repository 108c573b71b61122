//! Run configuration.
//!
//! All parameters come from environment-style key/value inputs (a `.env`
//! file is honored). Everything is validated eagerly here so a missing or
//! malformed value fails the run before any remote mutation happens, with
//! the offending key named.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono_tz::Tz;
use thiserror::Error;

use minaret_providers::{ReconcilePolicy, ServiceAccountKey, SourceKind, SyncResult};

/// Errors from loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required key is absent (or empty).
    #[error("missing required configuration: {key}")]
    Missing { key: &'static str },

    /// A key is present but its value does not parse.
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Where the bootstrap service-account key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapKey {
    /// Key JSON supplied inline via `GOOGLE_SERVICE_ACCOUNT_JSON`.
    Inline(String),
    /// Path to a key file via `GOOGLE_APPLICATION_CREDENTIALS`.
    Path(PathBuf),
}

impl BootstrapKey {
    /// Loads and parses the key material.
    pub fn load(&self) -> SyncResult<ServiceAccountKey> {
        match self {
            Self::Inline(json) => ServiceAccountKey::from_json(json),
            Self::Path(path) => ServiceAccountKey::from_file(path),
        }
    }
}

/// Validated run parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cloud project holding the calendar service-account secret.
    pub project_id: String,
    /// Secret holding the calendar key; `None` means "the only secret".
    pub secret_name: Option<String>,
    /// Known calendar id; set, it bypasses directory resolution.
    pub calendar_id: Option<String>,
    /// Display names to resolve when no calendar id is given.
    pub calendar_names: Vec<String>,
    /// Timezone events are created in.
    pub timezone: Tz,
    /// Account to share resolved calendars with, as a writer.
    pub email: Option<String>,
    /// Which source to scrape.
    pub source: SourceKind,
    /// Dedup policy for repeated runs.
    pub policy: ReconcilePolicy,
    /// Bootstrap identity for Secret Manager access.
    pub bootstrap: BootstrapKey,
}

/// Default timezone when `TIMEZONE` is unset.
const DEFAULT_TIMEZONE: &str = "Europe/London";

impl Config {
    /// Loads configuration from the process environment (and `.env`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Builds configuration from an explicit key/value snapshot.
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let project_id = get("PROJECT_ID").ok_or(ConfigError::Missing { key: "PROJECT_ID" })?;
        let secret_name = get("SECRET_NAME");
        let calendar_id = get("CALENDAR_ID");

        let calendar_names: Vec<String> = get("CALENDAR_NAME")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if calendar_id.is_none() && calendar_names.is_empty() {
            return Err(ConfigError::Missing {
                key: "CALENDAR_NAME",
            });
        }

        let timezone: Tz = get("TIMEZONE")
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string())
            .parse()
            .map_err(|e: chrono_tz::ParseError| ConfigError::Invalid {
                key: "TIMEZONE",
                message: e.to_string(),
            })?;

        let email = get("EMAIL");

        let source = match get("SOURCE") {
            Some(raw) => raw.parse().map_err(|e: minaret_providers::SyncError| {
                ConfigError::Invalid {
                    key: "SOURCE",
                    message: e.to_string(),
                }
            })?,
            None => SourceKind::leeds_grand_mosque(),
        };

        let policy = match get("SYNC_POLICY") {
            Some(raw) => raw.parse().map_err(|e: minaret_providers::SyncError| {
                ConfigError::Invalid {
                    key: "SYNC_POLICY",
                    message: e.to_string(),
                }
            })?,
            None => ReconcilePolicy::SkipIfExists,
        };

        let bootstrap = if let Some(json) = get("GOOGLE_SERVICE_ACCOUNT_JSON") {
            BootstrapKey::Inline(json)
        } else if let Some(path) = get("GOOGLE_APPLICATION_CREDENTIALS") {
            BootstrapKey::Path(PathBuf::from(path))
        } else {
            return Err(ConfigError::Missing {
                key: "GOOGLE_APPLICATION_CREDENTIALS",
            });
        };

        Ok(Self {
            project_id,
            secret_name,
            calendar_id,
            calendar_names,
            timezone,
            email,
            source,
            policy,
            bootstrap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn minimal() -> Vec<(String, String)> {
        vars(&[
            ("PROJECT_ID", "my-project"),
            ("CALENDAR_NAME", "Leeds Grand Mosque Prayer Times"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/etc/minaret/key.json"),
        ])
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::from_vars(minimal()).unwrap();
        assert_eq!(config.project_id, "my-project");
        assert_eq!(config.timezone.name(), "Europe/London");
        assert_eq!(config.policy, ReconcilePolicy::SkipIfExists);
        assert_eq!(config.source, SourceKind::leeds_grand_mosque());
        assert!(config.calendar_id.is_none());
        assert_eq!(
            config.calendar_names,
            vec!["Leeds Grand Mosque Prayer Times".to_string()]
        );
    }

    #[test]
    fn missing_project_id_names_the_key() {
        let err = Config::from_vars(vars(&[
            ("CALENDAR_NAME", "X"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/key.json"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PROJECT_ID"));
    }

    #[test]
    fn needs_calendar_id_or_name() {
        let err = Config::from_vars(vars(&[
            ("PROJECT_ID", "my-project"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/key.json"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Missing {
                key: "CALENDAR_NAME"
            }
        ));

        let mut with_id = minimal();
        with_id.retain(|(k, _)| k != "CALENDAR_NAME");
        with_id.push(("CALENDAR_ID".to_string(), "abc@group.calendar.google.com".to_string()));
        let config = Config::from_vars(with_id).unwrap();
        assert_eq!(
            config.calendar_id.as_deref(),
            Some("abc@group.calendar.google.com")
        );
    }

    #[test]
    fn comma_separated_calendar_names_split() {
        let mut input = minimal();
        input.retain(|(k, _)| k != "CALENDAR_NAME");
        input.push((
            "CALENDAR_NAME".to_string(),
            "Mosque A Prayer Times, Mosque B Prayer Times".to_string(),
        ));
        let config = Config::from_vars(input).unwrap();
        assert_eq!(
            config.calendar_names,
            vec![
                "Mosque A Prayer Times".to_string(),
                "Mosque B Prayer Times".to_string()
            ]
        );
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let mut input = minimal();
        input.push(("TIMEZONE".to_string(), "Europe/Atlantis".to_string()));
        let err = Config::from_vars(input).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "TIMEZONE", .. }));
    }

    #[test]
    fn bad_policy_is_rejected() {
        let mut input = minimal();
        input.push(("SYNC_POLICY".to_string(), "wipe".to_string()));
        let err = Config::from_vars(input).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SYNC_POLICY",
                ..
            }
        ));
    }

    #[test]
    fn policy_and_source_parse() {
        let mut input = minimal();
        input.push(("SYNC_POLICY".to_string(), "clear".to_string()));
        input.push((
            "SOURCE".to_string(),
            "sheet:https://example.org/pub?output=csv".to_string(),
        ));
        let config = Config::from_vars(input).unwrap();
        assert_eq!(config.policy.as_str(), "clear");
        assert!(matches!(config.source, SourceKind::Sheet { .. }));
    }

    #[test]
    fn inline_key_takes_precedence_over_path() {
        let mut input = minimal();
        input.push((
            "GOOGLE_SERVICE_ACCOUNT_JSON".to_string(),
            "{\"client_email\": \"a@b\", \"private_key\": \"k\"}".to_string(),
        ));
        let config = Config::from_vars(input).unwrap();
        assert!(matches!(config.bootstrap, BootstrapKey::Inline(_)));
    }

    #[test]
    fn missing_bootstrap_key_names_the_key() {
        let mut input = minimal();
        input.retain(|(k, _)| k != "GOOGLE_APPLICATION_CREDENTIALS");
        let err = Config::from_vars(input).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_APPLICATION_CREDENTIALS"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let err = Config::from_vars(vars(&[
            ("PROJECT_ID", "  "),
            ("CALENDAR_NAME", "X"),
            ("GOOGLE_APPLICATION_CREDENTIALS", "/key.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "PROJECT_ID" }));
    }
}
