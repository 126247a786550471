//! Firebase web app configuration, as pasted from the Firebase console.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

impl fmt::Debug for FirebaseConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FirebaseConfig")
            .field("api_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("auth_domain", &self.auth_domain)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Parses the Firebase JSON blob.
///
/// An empty object means "not configured". A blob that fails to parse, or
/// that lacks an API key or project id, is reported as an error message so
/// the caller can log it and carry on unconfigured.
pub fn parse_firebase_config(raw: &str) -> Result<Option<FirebaseConfig>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|error| format!("invalid JSON: {error}"))?;
    if value.as_object().is_some_and(serde_json::Map::is_empty) {
        return Ok(None);
    }

    let mut config: FirebaseConfig =
        serde_json::from_value(value).map_err(|error| error.to_string())?;
    config.api_key = normalize_text_option(Some(config.api_key))
        .ok_or_else(|| "apiKey must not be empty".to_string())?;
    config.project_id = normalize_text_option(Some(config.project_id))
        .ok_or_else(|| "projectId must not be empty".to_string())?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_console_snippet() {
        let config = parse_firebase_config(
            r#"{
                "apiKey": " AIza-demo ",
                "authDomain": "demo.firebaseapp.com",
                "projectId": "demo",
                "storageBucket": "demo.appspot.com",
                "messagingSenderId": "123",
                "appId": "1:123:web:abc"
            }"#,
        )
        .unwrap()
        .unwrap();

        assert_eq!(config.api_key, "AIza-demo");
        assert_eq!(config.project_id, "demo");
        assert_eq!(config.auth_domain.as_deref(), Some("demo.firebaseapp.com"));
    }

    #[test]
    fn empty_object_is_unconfigured() {
        assert_eq!(parse_firebase_config("{}"), Ok(None));
        assert_eq!(parse_firebase_config("   "), Ok(None));
    }

    #[test]
    fn malformed_or_incomplete_blobs_are_errors() {
        assert!(parse_firebase_config("{apiKey:").is_err());
        assert!(parse_firebase_config(r#"{"apiKey":"k"}"#).is_err());
        assert!(parse_firebase_config(r#"{"apiKey":" ","projectId":"p"}"#).is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = parse_firebase_config(r#"{"apiKey":"sensitive-key","projectId":"p"}"#)
            .unwrap()
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sensitive-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
