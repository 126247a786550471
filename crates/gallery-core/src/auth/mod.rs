//! Identity provider capability and shared session types.

mod firebase;

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::Identity;
use crate::util::unix_timestamp_now;

pub use firebase::FirebaseAuthClient;
pub(crate) use firebase::parse_api_error as firebase_api_error;

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub anonymous: bool,
}

/// Credentials for a signed-in user, persisted so the identity can be resumed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }

    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity::new(self.user.id.clone())
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Auth API error: {0}")]
    Api(String),
    #[error("Not signed in")]
    SignedOut,
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a provider keeps its session between launches.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load(&self) -> AuthResult<Option<AuthSession>>;
    fn save(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear(&self) -> AuthResult<()>;
}

/// Process-lifetime session storage, for hosts without a secure store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<AuthSession>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load(&self) -> AuthResult<Option<AuthSession>> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &AuthSession) -> AuthResult<()> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}

/// What the provider currently knows about the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    /// The provider has not settled yet; listeners are not notified of this.
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Identity),
}

/// Publishes identity changes to any number of listeners.
#[derive(Debug, Clone)]
pub struct IdentityNotifier {
    sender: Arc<watch::Sender<IdentityState>>,
}

impl Default for IdentityNotifier {
    fn default() -> Self {
        let (sender, _) = watch::channel(IdentityState::Unknown);
        Self {
            sender: Arc::new(sender),
        }
    }
}

impl IdentityNotifier {
    /// Publish a new state. Listeners only hear about actual changes.
    pub fn publish(&self, state: IdentityState) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        })
    }

    /// Settle an unknown state to signed-out, leaving a known state alone.
    pub fn settle_signed_out(&self) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == IdentityState::Unknown {
                *current = IdentityState::SignedOut;
                true
            } else {
                false
            }
        })
    }

    #[must_use]
    pub fn current(&self) -> IdentityState {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> IdentityChanges {
        IdentityChanges::new(self.sender.subscribe())
    }
}

/// Stream of identity notifications handed to a listener.
///
/// The current state, once settled, is delivered first. Dropping the value
/// unsubscribes.
#[derive(Debug)]
pub struct IdentityChanges {
    receiver: watch::Receiver<IdentityState>,
}

impl IdentityChanges {
    fn new(mut receiver: watch::Receiver<IdentityState>) -> Self {
        receiver.mark_changed();
        Self { receiver }
    }

    /// Wait for the next notification: `Some(None)` is a sign-out, `None`
    /// means the provider is gone.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        loop {
            self.receiver.changed().await.ok()?;
            match &*self.receiver.borrow_and_update() {
                IdentityState::Unknown => {}
                IdentityState::SignedOut => return Some(None),
                IdentityState::SignedIn(identity) => return Some(Some(identity.clone())),
            }
        }
    }
}

/// Capability to establish an identity and report changes to it.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Resume the current anonymous user, or create one.
    fn sign_in_anonymously(&self) -> impl Future<Output = AuthResult<Identity>> + Send;

    /// Exchange an externally supplied token for an identity.
    fn sign_in_with_token(&self, token: &str) -> impl Future<Output = AuthResult<Identity>> + Send;

    fn on_identity_changed(&self) -> IdentityChanges;
}
