//! Session controller: establishes an identity and reports readiness.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::auth::IdentityProvider;
use crate::error::Error;
use crate::models::Identity;
use crate::subscription::Subscription;

/// Snapshot of the session observed by the gallery and the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStatus {
    pub started: bool,
    pub identity: Option<Identity>,
    /// Set by the first identity notification and never cleared.
    pub is_ready: bool,
    pub failure: Option<Error>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    Authenticating,
    Ready(Option<Identity>),
    Failed(Error),
}

impl SessionStatus {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if let Some(failure) = &self.failure {
            return SessionPhase::Failed(failure.clone());
        }
        if !self.started {
            return SessionPhase::Initializing;
        }
        if self.is_ready {
            SessionPhase::Ready(self.identity.clone())
        } else {
            SessionPhase::Authenticating
        }
    }
}

pub struct SessionController<P> {
    provider: Option<Arc<P>>,
    bootstrap_token: Option<String>,
    status: Arc<watch::Sender<SessionStatus>>,
    listener: Subscription,
    sign_in: Subscription,
    disposed: AtomicBool,
}

impl<P: IdentityProvider> SessionController<P> {
    /// `provider` is `None` when no identity backend is configured.
    pub fn new(provider: Option<Arc<P>>, bootstrap_token: Option<String>) -> Self {
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            provider,
            bootstrap_token,
            status: Arc::new(status),
            listener: Subscription::default(),
            sign_in: Subscription::default(),
            disposed: AtomicBool::new(false),
        }
    }

    /// Start listening for identity changes, then sign in.
    ///
    /// Only the first call after construction has any effect. Must be called
    /// from within a tokio runtime.
    pub fn init(&self) {
        if self.disposed.load(Ordering::Acquire) {
            return;
        }
        let first_start = self.status.send_if_modified(|status| {
            if status.started {
                false
            } else {
                status.started = true;
                true
            }
        });
        if !first_start {
            return;
        }

        let Some(provider) = self.provider.as_ref() else {
            tracing::error!("No identity provider configured");
            self.status
                .send_modify(|status| status.failure = Some(Error::ConfigurationMissing));
            return;
        };

        let mut changes = provider.on_identity_changed();
        let status = Arc::clone(&self.status);
        self.listener.replace(async move {
            while let Some(identity) = changes.next().await {
                status.send_modify(|status| {
                    if !status.is_ready {
                        tracing::info!("Session ready");
                        status.is_ready = true;
                    }
                    status.identity = identity;
                });
            }
        });

        let provider = Arc::clone(provider);
        let token = self.bootstrap_token.clone();
        let status = Arc::clone(&self.status);
        self.sign_in.replace(async move {
            let result = match token.as_deref() {
                Some(token) => {
                    tracing::info!("Signing in with bootstrap token");
                    provider.sign_in_with_token(token).await
                }
                None => {
                    tracing::info!("Signing in anonymously");
                    provider.sign_in_anonymously().await
                }
            };
            match result {
                Ok(identity) => tracing::debug!("Signed in as {}", identity),
                Err(error) => {
                    tracing::error!("Sign-in failed: {}", error);
                    status.send_modify(|status| {
                        status.failure = Some(Error::AuthenticationFailed(error.to_string()));
                    });
                }
            }
        });
    }

    /// Release the identity listener and any in-flight sign-in.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.listener.cancel();
        self.sign_in.cancel();
        tracing::debug!("Session disposed");
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.status.borrow().identity.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.status.borrow().is_ready
    }

    pub fn failure_reason(&self) -> Option<Error> {
        self.status.borrow().failure.clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }
}
