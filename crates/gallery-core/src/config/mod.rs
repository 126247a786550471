//! Runtime configuration loaded from the process environment.

mod firebase;

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::gallery::UnlockRetention;
use crate::util::normalize_text_option;

pub use firebase::{parse_firebase_config, FirebaseConfig};

pub const DEFAULT_APP_ID: &str = "default-app-id";
pub const DEFAULT_SYNC_POLL_SECS: u64 = 3;

const FIREBASE_CONFIG_VAR: &str = "GALLERY_FIREBASE_CONFIG";
const APP_ID_VAR: &str = "GALLERY_APP_ID";
const INITIAL_AUTH_TOKEN_VAR: &str = "GALLERY_INITIAL_AUTH_TOKEN";
const SYNC_POLL_SECS_VAR: &str = "GALLERY_SYNC_POLL_SECS";
const UNLOCK_RETENTION_VAR: &str = "GALLERY_UNLOCK_RETENTION";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub app_id: String,
    /// `None` when Firebase is not configured; the session then fails with
    /// "configuration missing".
    pub firebase: Option<FirebaseConfig>,
    pub initial_auth_token: Option<String>,
    pub sync_poll_interval: Duration,
    pub retention: UnlockRetention,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            firebase: None,
            initial_auth_token: None,
            sync_poll_interval: Duration::from_secs(DEFAULT_SYNC_POLL_SECS),
            retention: UnlockRetention::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_id = normalize_text_option(lookup(APP_ID_VAR))
            .unwrap_or_else(|| DEFAULT_APP_ID.to_string());

        let firebase = lookup(FIREBASE_CONFIG_VAR).and_then(|raw| {
            parse_firebase_config(&raw).unwrap_or_else(|error| {
                tracing::warn!("Ignoring malformed {}: {}", FIREBASE_CONFIG_VAR, error);
                None
            })
        });

        let initial_auth_token = normalize_text_option(lookup(INITIAL_AUTH_TOKEN_VAR));

        let poll_secs = match normalize_text_option(lookup(SYNC_POLL_SECS_VAR)) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| (1..=300).contains(secs))
                .ok_or_else(|| {
                    ConfigError::Invalid(format!(
                        "{SYNC_POLL_SECS_VAR} must be an integer in [1, 300]"
                    ))
                })?,
            None => DEFAULT_SYNC_POLL_SECS,
        };

        let retention = match normalize_text_option(lookup(UNLOCK_RETENTION_VAR)) {
            Some(raw) => raw.parse::<UnlockRetention>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{UNLOCK_RETENTION_VAR} must be 'preserve' or 'reset'"
                ))
            })?,
            None => UnlockRetention::default(),
        };

        Ok(Self {
            app_id,
            firebase,
            initial_auth_token,
            sync_poll_interval: Duration::from_secs(poll_secs),
            retention,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        AppConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_string()))
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(config_from(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("GALLERY_APP_ID", " gallery-prod "),
            (
                "GALLERY_FIREBASE_CONFIG",
                r#"{"apiKey":"key","projectId":"demo"}"#,
            ),
            ("GALLERY_INITIAL_AUTH_TOKEN", "custom-token"),
            ("GALLERY_SYNC_POLL_SECS", "10"),
            ("GALLERY_UNLOCK_RETENTION", "reset"),
        ])
        .unwrap();

        assert_eq!(config.app_id, "gallery-prod");
        assert_eq!(
            config.firebase.map(|firebase| firebase.project_id),
            Some("demo".to_string())
        );
        assert_eq!(config.initial_auth_token.as_deref(), Some("custom-token"));
        assert_eq!(config.sync_poll_interval, Duration::from_secs(10));
        assert_eq!(config.retention, UnlockRetention::Reset);
    }

    #[test]
    fn malformed_firebase_json_leaves_firebase_unconfigured() {
        let config = config_from(&[("GALLERY_FIREBASE_CONFIG", "{not json")]).unwrap();
        assert_eq!(config.firebase, None);
    }

    #[test]
    fn blank_token_is_treated_as_absent() {
        let config = config_from(&[("GALLERY_INITIAL_AUTH_TOKEN", "  ")]).unwrap();
        assert_eq!(config.initial_auth_token, None);
    }

    #[test]
    fn rejects_out_of_range_poll_interval() {
        let error = config_from(&[("GALLERY_SYNC_POLL_SECS", "0")]).unwrap_err();
        assert!(error.to_string().contains("GALLERY_SYNC_POLL_SECS"));
        assert!(config_from(&[("GALLERY_SYNC_POLL_SECS", "soon")]).is_err());
    }

    #[test]
    fn rejects_unknown_retention() {
        let error = config_from(&[("GALLERY_UNLOCK_RETENTION", "forever")]).unwrap_err();
        assert!(error.to_string().contains("GALLERY_UNLOCK_RETENTION"));
    }
}
