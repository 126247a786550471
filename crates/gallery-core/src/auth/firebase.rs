//! Firebase Authentication client over the Identity Toolkit REST API.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{
    AuthError, AuthResult, AuthSession, AuthUser, IdentityChanges, IdentityNotifier,
    IdentityProvider, IdentityState, SessionPersistence,
};
use crate::models::Identity;
use crate::store::TokenSource;
use crate::util::unix_timestamp_now;

const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";
const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3_600;

pub struct FirebaseAuthClient<S: SessionPersistence> {
    api_key: String,
    client: Client,
    store: S,
    session: Arc<RwLock<Option<AuthSession>>>,
    notifier: IdentityNotifier,
}

impl<S: SessionPersistence> Clone for FirebaseAuthClient<S> {
    fn clone(&self) -> Self {
        Self {
            api_key: self.api_key.clone(),
            client: self.client.clone(),
            store: self.store.clone(),
            session: Arc::clone(&self.session),
            notifier: self.notifier.clone(),
        }
    }
}

impl<S: SessionPersistence> FirebaseAuthClient<S> {
    pub fn new(api_key: impl Into<String>, store: S) -> AuthResult<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Firebase API key must not be empty",
            ));
        }

        Ok(Self {
            api_key,
            client: Client::builder().build()?,
            store,
            session: Arc::new(RwLock::new(None)),
            notifier: IdentityNotifier::default(),
        })
    }

    /// Load the persisted session, refreshing it if it has expired.
    ///
    /// An unreadable or unrefreshable session is discarded rather than
    /// surfaced as an error, so the caller falls through to a fresh sign-in.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let stored_session = match self.store.load() {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(error) => {
                tracing::warn!("Discarding unreadable persisted session: {}", error);
                self.forget_persisted();
                return Ok(None);
            }
        };

        if !stored_session.is_expired() {
            return Ok(Some(stored_session));
        }

        match self.refresh_session(&stored_session).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Failed to refresh persisted session: {}", error);
                self.forget_persisted();
                Ok(None)
            }
        }
    }

    /// Forget the current user locally and notify listeners.
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.session.write().await.take();
        self.store.clear()?;
        self.notifier.publish(IdentityState::SignedOut);
        Ok(())
    }

    async fn anonymous_sign_in(&self) -> AuthResult<Identity> {
        if let Some(session) = self.restore_session().await? {
            if session.user.anonymous {
                tracing::info!("Resumed anonymous session for {}", session.user.id);
                return self.establish(session).await;
            }
        }

        let payload = serde_json::json!({ "returnSecureToken": true });
        let response: SignInResponse = self
            .send(
                self.client
                    .post(self.identity_url("accounts:signUp"))
                    .json(&payload),
            )
            .await?;
        let local_id = response.local_id.clone().ok_or_else(|| {
            AuthError::Api("Anonymous sign-up response did not include a user id".to_string())
        })?;
        let session = response.into_session(AuthUser {
            id: local_id,
            anonymous: true,
        });
        self.establish(session).await
    }

    async fn custom_token_sign_in(&self, token: &str) -> AuthResult<Identity> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Custom auth token must not be empty",
            ));
        }

        let payload = serde_json::json!({
            "token": token,
            "returnSecureToken": true,
        });
        let response: SignInResponse = self
            .send(
                self.client
                    .post(self.identity_url("accounts:signInWithCustomToken"))
                    .json(&payload),
            )
            .await?;
        let user = self.lookup_user(&response.id_token).await?;
        self.establish(response.into_session(user)).await
    }

    async fn lookup_user(&self, id_token: &str) -> AuthResult<AuthUser> {
        let payload = serde_json::json!({ "idToken": id_token });
        let response: LookupResponse = self
            .send(
                self.client
                    .post(self.identity_url("accounts:lookup"))
                    .json(&payload),
            )
            .await?;
        response
            .users
            .into_iter()
            .next()
            .map(|user| AuthUser {
                id: user.local_id,
                anonymous: false,
            })
            .ok_or_else(|| AuthError::Api("Lookup response did not include a user".to_string()))
    }

    async fn refresh_session(&self, session: &AuthSession) -> AuthResult<AuthSession> {
        if session.refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "Refresh token must not be empty",
            ));
        }

        let response: RefreshResponse = self
            .send(
                self.client
                    .post(SECURE_TOKEN_URL)
                    .query(&[("key", self.api_key.as_str())])
                    .form(&[
                        ("grant_type", "refresh_token"),
                        ("refresh_token", session.refresh_token.as_str()),
                    ]),
            )
            .await?;

        let refreshed = AuthSession {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: expires_at_from(response.expires_in.as_deref()),
            user: AuthUser {
                id: response.user_id.unwrap_or_else(|| session.user.id.clone()),
                anonymous: session.user.anonymous,
            },
        };
        self.persist(&refreshed);
        Ok(refreshed)
    }

    /// The identity is valid once the provider has issued it; failing to cache
    /// it only costs a fresh sign-in on the next launch.
    async fn establish(&self, session: AuthSession) -> AuthResult<Identity> {
        self.persist(&session);
        let identity = session.identity();
        *self.session.write().await = Some(session);
        self.notifier.publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    fn persist(&self, session: &AuthSession) {
        if let Err(error) = self.store.save(session) {
            tracing::warn!("Failed to persist Firebase session: {}", error);
        }
    }

    fn forget_persisted(&self) {
        if let Err(error) = self.store.clear() {
            tracing::warn!("Failed to clear persisted Firebase session: {}", error);
        }
    }

    fn identity_url(&self, method: &str) -> String {
        format!("{IDENTITY_TOOLKIT_URL}/{method}?key={}", self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> AuthResult<T> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Api(parse_api_error(status, &body)));
        }
        Ok(response.json::<T>().await?)
    }

    /// A failed sign-in still settles the provider so listeners hear a
    /// signed-out notification.
    fn settle<T>(&self, result: &AuthResult<T>) {
        if let Err(error) = result {
            tracing::warn!("Firebase sign-in failed: {}", error);
            self.notifier.settle_signed_out();
        }
    }
}

impl<S: SessionPersistence> IdentityProvider for FirebaseAuthClient<S> {
    async fn sign_in_anonymously(&self) -> AuthResult<Identity> {
        let result = self.anonymous_sign_in().await;
        self.settle(&result);
        result
    }

    async fn sign_in_with_token(&self, token: &str) -> AuthResult<Identity> {
        let result = self.custom_token_sign_in(token).await;
        self.settle(&result);
        result
    }

    fn on_identity_changed(&self) -> IdentityChanges {
        self.notifier.subscribe()
    }
}

impl<S: SessionPersistence> TokenSource for FirebaseAuthClient<S> {
    async fn id_token(&self) -> AuthResult<String> {
        let current = self.session.read().await.clone();
        let Some(session) = current else {
            return Err(AuthError::SignedOut);
        };
        if !session.is_expired() {
            return Ok(session.id_token);
        }

        tracing::debug!("Refreshing expired Firebase ID token");
        let refreshed = self.refresh_session(&session).await?;
        let id_token = refreshed.id_token.clone();
        *self.session.write().await = Some(refreshed);
        Ok(id_token)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    local_id: Option<String>,
}

impl SignInResponse {
    fn into_session(self, user: AuthUser) -> AuthSession {
        AuthSession {
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: expires_at_from(self.expires_in.as_deref()),
            user,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorResponse {
    error: Option<FirebaseErrorBody>,
}

#[derive(Debug, Deserialize)]
struct FirebaseErrorBody {
    message: Option<String>,
}

/// Firebase sends lifetimes as decimal strings, e.g. `"3600"`.
fn expires_at_from(expires_in: Option<&str>) -> i64 {
    let seconds = expires_in
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECONDS);
    unix_timestamp_now().saturating_add(seconds)
}

pub(crate) fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<FirebaseErrorResponse>(body) {
        if let Some(message) = payload.error.and_then(|error| error.message) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
