//! Wires the session, gallery feed, and unlock countdown together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;

use crate::auth::{FirebaseAuthClient, IdentityProvider, SessionPersistence};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gallery::{GalleryHandle, GallerySynchronizer, GalleryState, UnlockRetention};
use crate::models::{GalleryItem, ItemId, UploadForm};
use crate::session::{SessionController, SessionStatus};
use crate::store::{DocumentStore, FirestoreClient, Namespace};
use crate::subscription::Subscription;
use crate::unlock::{UnlockController, UnlockMachine};

/// Explicitly constructed capabilities and settings for one runtime.
pub struct Backend<P, S> {
    /// `None` when no identity provider is configured.
    pub identity: Option<Arc<P>>,
    pub store: Option<Arc<S>>,
    pub app_id: String,
    pub initial_auth_token: Option<String>,
    pub retention: UnlockRetention,
}

pub type FirebaseBackend<S> =
    Backend<FirebaseAuthClient<S>, FirestoreClient<FirebaseAuthClient<S>>>;

pub type FirebaseRuntime<S> =
    GalleryRuntime<FirebaseAuthClient<S>, FirestoreClient<FirebaseAuthClient<S>>>;

/// Build the Firebase-backed capabilities described by `config`.
///
/// Missing or unusable Firebase settings leave both capabilities unset, which
/// the session reports as "configuration missing".
pub fn firebase_backend<S: SessionPersistence>(
    config: &AppConfig,
    persistence: S,
) -> FirebaseBackend<S> {
    let mut backend = Backend {
        identity: None,
        store: None,
        app_id: config.app_id.clone(),
        initial_auth_token: config.initial_auth_token.clone(),
        retention: config.retention,
    };

    let Some(firebase) = config.firebase.as_ref() else {
        tracing::warn!("Firebase is not configured");
        return backend;
    };

    let auth = match FirebaseAuthClient::new(firebase.api_key.clone(), persistence) {
        Ok(auth) => Arc::new(auth),
        Err(error) => {
            tracing::error!("Failed to create Firebase auth client: {}", error);
            return backend;
        }
    };
    match FirestoreClient::new(
        &firebase.project_id,
        Arc::clone(&auth),
        config.sync_poll_interval,
    ) {
        Ok(store) => {
            backend.identity = Some(auth);
            backend.store = Some(Arc::new(store));
        }
        Err(error) => tracing::error!("Failed to create Firestore client: {}", error),
    }
    backend
}

/// Which top-level screen to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Failed(Error),
    Ready,
}

pub fn view_state_of(session: &SessionStatus, gallery: &GalleryState) -> ViewState {
    if let Some(error) = session.failure.as_ref().or(gallery.error.as_ref()) {
        return ViewState::Failed(error.clone());
    }
    if session.is_ready {
        ViewState::Ready
    } else {
        ViewState::Loading
    }
}

pub struct GalleryRuntime<P, S> {
    session: SessionController<P>,
    synchronizer: Mutex<Option<GallerySynchronizer<S>>>,
    gallery: GalleryHandle,
    unlock: UnlockController<GalleryHandle>,
    store: Option<Arc<S>>,
    app_id: String,
    orchestrator: Subscription,
    disposed: AtomicBool,
}

impl<P: IdentityProvider, S: DocumentStore> GalleryRuntime<P, S> {
    pub fn new(backend: Backend<P, S>) -> Self {
        let synchronizer = GallerySynchronizer::new(
            backend.store.clone(),
            backend.app_id.clone(),
            backend.retention,
        );
        let gallery = synchronizer.handle();
        Self {
            session: SessionController::new(backend.identity, backend.initial_auth_token),
            synchronizer: Mutex::new(Some(synchronizer)),
            unlock: UnlockController::new(gallery.clone()),
            gallery,
            store: backend.store,
            app_id: backend.app_id,
            orchestrator: Subscription::default(),
            disposed: AtomicBool::new(false),
        }
    }

    /// Start the session and keep the gallery feed in step with it.
    ///
    /// Only the first call has any effect, and none after [`Self::dispose`].
    /// Must run inside a tokio runtime.
    pub fn init(&self) {
        if self.disposed.load(Ordering::SeqCst) {
            tracing::debug!("Ignoring init of a disposed gallery runtime");
            return;
        }
        let Some(mut synchronizer) = self
            .synchronizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        let mut session = self.session.watch();
        self.orchestrator.replace(async move {
            loop {
                let status = session.borrow_and_update().clone();
                synchronizer.reconcile(&status);
                if session.changed().await.is_err() {
                    break;
                }
            }
            synchronizer.dispose();
        });
        self.session.init();
        tracing::info!("Gallery runtime started");
    }

    /// Tear everything down. Safe to call more than once.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.synchronizer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.unlock.dispose();
        self.orchestrator.cancel();
        self.session.dispose();
    }

    pub fn view_state(&self) -> ViewState {
        view_state_of(&self.session.status(), &self.gallery.state())
    }

    /// Validate `form` and store it for the current identity.
    ///
    /// Failures here are local to the upload form and never terminal.
    pub async fn upload(&self, form: &UploadForm) -> Result<ItemId> {
        let store = self
            .store
            .as_ref()
            .ok_or(Error::NotReady("document store is not configured"))?;
        let identity = self
            .session
            .current_identity()
            .ok_or(Error::NotReady("not signed in yet"))?;

        let record = form
            .validate()?
            .into_record(&identity, Utc::now())
            .into_fields()
            .map_err(|error| Error::Store(error.to_string()))?;
        let namespace = Namespace::for_items(&self.app_id, &identity);
        let id = store.insert(&namespace, record).await?;

        tracing::info!("Uploaded item {} to {}", id, namespace);
        Ok(ItemId::new(id))
    }

    pub fn request_unlock(&self, id: &ItemId) -> Result<()> {
        Ok(self.unlock.request_unlock(id)?)
    }

    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn watch_session(&self) -> watch::Receiver<SessionStatus> {
        self.session.watch()
    }

    pub fn items(&self) -> Vec<GalleryItem> {
        self.gallery.current_items()
    }

    pub fn watch_gallery(&self) -> watch::Receiver<GalleryState> {
        self.gallery.watch()
    }

    pub fn unlock_status(&self) -> UnlockMachine {
        self.unlock.status()
    }

    pub fn watch_unlock(&self) -> watch::Receiver<UnlockMachine> {
        self.unlock.watch()
    }

    pub fn reward_balance(&self) -> u64 {
        self.unlock.reward_balance()
    }
}
