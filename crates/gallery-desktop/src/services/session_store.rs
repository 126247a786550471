//! Firebase session persistence in the OS keyring.

use gallery_core::auth::{AuthError, AuthResult, AuthSession, SessionPersistence};
use keyring::Entry;

const KEYRING_SERVICE_NAME: &str = "prompt-gallery";
const KEYRING_SESSION_PREFIX: &str = "firebase_session";

/// Keeps the anonymous identity across launches so a user's gallery survives
/// a restart.
///
/// Sessions are keyed by Firebase project, so pointing the app at another
/// project never resumes a user id that project has not issued.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    username: String,
}

impl KeyringSessionStore {
    pub fn for_project(project_id: Option<&str>) -> Self {
        Self {
            username: session_username(project_id),
        }
    }

    fn entry(&self) -> AuthResult<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

fn session_username(project_id: Option<&str>) -> String {
    match project_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(project_id) => format!("{KEYRING_SESSION_PREFIX}:{project_id}"),
        None => KEYRING_SESSION_PREFIX.to_string(),
    }
}

/// `None` when the stored value is not a session this build can read.
fn decode_session(raw: &str) -> Option<AuthSession> {
    match serde_json::from_str(raw) {
        Ok(session) => Some(session),
        Err(error) => {
            tracing::warn!("Stored session is unreadable: {}", error);
            None
        }
    }
}

impl SessionPersistence for KeyringSessionStore {
    fn load(&self) -> AuthResult<Option<AuthSession>> {
        let entry = self.entry()?;
        let raw = match entry.get_password() {
            Ok(raw) => raw,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(error) => return Err(AuthError::SecureStorage(error.to_string())),
        };

        let session = decode_session(&raw);
        if session.is_none() {
            // Left in place it would fail every launch the same way
            if let Err(error) = entry.delete_credential() {
                tracing::warn!("Failed to remove unreadable session: {}", error);
            }
        }
        Ok(session)
    }

    fn save(&self, session: &AuthSession) -> AuthResult<()> {
        let serialized = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&serialized)
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }

    fn clear(&self) -> AuthResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AuthError::SecureStorage(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use gallery_core::auth::AuthUser;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn username_is_scoped_by_project() {
        assert_eq!(
            session_username(Some(" demo-gallery ")),
            "firebase_session:demo-gallery"
        );
        assert_eq!(session_username(Some("  ")), "firebase_session");
        assert_eq!(session_username(None), "firebase_session");
    }

    #[test]
    fn decode_reads_stored_session() {
        let session = AuthSession {
            id_token: "id".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "anon-user".to_string(),
                anonymous: true,
            },
        };
        let raw = serde_json::to_string(&session).unwrap();
        assert_eq!(decode_session(&raw), Some(session));
    }

    #[test]
    fn decode_rejects_corrupt_entries() {
        assert_eq!(decode_session("{1}"), None);
        assert_eq!(decode_session(r#"{"id_token":"only"}"#), None);
    }
}
