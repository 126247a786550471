//! Live gallery feed for the signed-in identity.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;

use crate::error::Error;
use crate::models::{sort_newest_first, GalleryItem, Identity, ItemId};
use crate::session::SessionStatus;
use crate::store::{Document, DocumentStore, Namespace};
use crate::subscription::Subscription;
use crate::unlock::UnlockTarget;

/// What happens to local unlock flags when a new snapshot arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnlockRetention {
    /// Items keep their flag across snapshots, matched by id.
    #[default]
    PreserveById,
    /// Every snapshot starts fully locked.
    Reset,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown unlock retention '{0}'")]
pub struct UnknownRetention(String);

impl FromStr for UnlockRetention {
    type Err = UnknownRetention;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "preserve" | "preserve-by-id" => Ok(Self::PreserveById),
            "reset" => Ok(Self::Reset),
            other => Err(UnknownRetention(other.to_string())),
        }
    }
}

/// Build the published list from a full snapshot.
pub fn merge_snapshot(
    previous: &[GalleryItem],
    documents: &[Document],
    retention: UnlockRetention,
    now: DateTime<Utc>,
) -> Vec<GalleryItem> {
    let unlocked: HashSet<&ItemId> = match retention {
        UnlockRetention::PreserveById => previous
            .iter()
            .filter(|item| item.is_unlocked)
            .map(|item| &item.id)
            .collect(),
        UnlockRetention::Reset => HashSet::new(),
    };

    let mut items: Vec<GalleryItem> = documents
        .iter()
        .map(|document| {
            let mut item = GalleryItem::from_document(document, now);
            item.is_unlocked = unlocked.contains(&item.id);
            item
        })
        .collect();
    sort_newest_first(&mut items);
    items
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryState {
    /// Newest first.
    pub items: Vec<GalleryItem>,
    pub loading: bool,
    /// Fatal feed error. Once set the feed is never reopened.
    pub error: Option<Error>,
    feed: u64,
}

/// Shared view of the gallery list. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GalleryHandle {
    state: Arc<watch::Sender<GalleryState>>,
}

impl Default for GalleryHandle {
    fn default() -> Self {
        let (state, _) = watch::channel(GalleryState::default());
        Self {
            state: Arc::new(state),
        }
    }
}

impl GalleryHandle {
    pub fn state(&self) -> GalleryState {
        self.state.borrow().clone()
    }

    pub fn current_items(&self) -> Vec<GalleryItem> {
        self.state.borrow().items.clone()
    }

    pub fn last_error(&self) -> Option<Error> {
        self.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn watch(&self) -> watch::Receiver<GalleryState> {
        self.state.subscribe()
    }

    /// Clear the list and start a new feed generation. Deliveries tagged
    /// with an older generation are dropped from here on.
    fn open_feed(&self) -> u64 {
        let mut feed = 0;
        self.state.send_modify(|state| {
            state.feed += 1;
            state.items.clear();
            state.loading = true;
            feed = state.feed;
        });
        feed
    }

    fn close_feed(&self, clear: bool) {
        self.state.send_modify(|state| {
            state.feed += 1;
            state.loading = false;
            if clear {
                state.items.clear();
            }
        });
    }

    fn apply_snapshot(
        &self,
        feed: u64,
        documents: &[Document],
        retention: UnlockRetention,
        now: DateTime<Utc>,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if state.feed != feed {
                return false;
            }
            state.items = merge_snapshot(&state.items, documents, retention, now);
            state.loading = false;
            true
        })
    }

    fn fail(&self, feed: u64, error: Error) {
        self.state.send_if_modified(|state| {
            if state.feed != feed {
                return false;
            }
            state.error = Some(error);
            state.loading = false;
            true
        });
    }
}

impl UnlockTarget for GalleryHandle {
    fn lock_state(&self, id: &ItemId) -> Option<bool> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|item| &item.id == id)
            .map(|item| item.is_unlocked)
    }

    fn mark_unlocked(&self, id: &ItemId) -> bool {
        let mut found = false;
        self.state.send_if_modified(|state| {
            let Some(item) = state.items.iter_mut().find(|item| &item.id == id) else {
                return false;
            };
            found = true;
            let changed = !item.is_unlocked;
            item.is_unlocked = true;
            changed
        });
        found
    }
}

struct ActiveFeed {
    identity: Identity,
    _task: Subscription,
}

/// Keeps at most one live query open, scoped to the current identity.
pub struct GallerySynchronizer<S> {
    store: Option<Arc<S>>,
    app_id: String,
    retention: UnlockRetention,
    handle: GalleryHandle,
    active: Option<ActiveFeed>,
}

impl<S: DocumentStore> GallerySynchronizer<S> {
    pub fn new(
        store: Option<Arc<S>>,
        app_id: impl Into<String>,
        retention: UnlockRetention,
    ) -> Self {
        Self {
            store,
            app_id: app_id.into(),
            retention,
            handle: GalleryHandle::default(),
            active: None,
        }
    }

    pub fn handle(&self) -> GalleryHandle {
        self.handle.clone()
    }

    /// Open, switch, or close the feed to match the session.
    ///
    /// The feed is open only while the session is ready with an identity, a
    /// store is configured, and neither side has failed.
    pub fn reconcile(&mut self, session: &SessionStatus) {
        if session.failure.is_some() || self.handle.last_error().is_some() {
            self.close(false);
            return;
        }

        let target = if session.is_ready && self.store.is_some() {
            session.identity.clone()
        } else {
            None
        };
        if self.active.as_ref().map(|active| &active.identity) == target.as_ref() {
            return;
        }

        self.close(true);
        if let Some(identity) = target {
            self.open(identity);
        }
    }

    /// Stop the feed, keeping the list as it is.
    pub fn dispose(&mut self) {
        self.close(false);
    }

    fn close(&mut self, clear: bool) {
        if let Some(active) = self.active.take() {
            tracing::info!("Closing gallery feed for {}", active.identity);
            self.handle.close_feed(clear);
        }
    }

    fn open(&mut self, identity: Identity) {
        let Some(store) = self.store.clone() else {
            return;
        };
        let namespace = Namespace::for_items(&self.app_id, &identity);
        let feed = self.handle.open_feed();
        let handle = self.handle.clone();
        let retention = self.retention;
        tracing::info!("Opening gallery feed on {}", namespace);

        let task = Subscription::spawn(async move {
            let mut stream = match store.subscribe(&namespace).await {
                Ok(stream) => stream,
                Err(error) => {
                    tracing::error!("Failed to subscribe to {}: {}", namespace, error);
                    handle.fail(feed, Error::SubscriptionFailed(error.to_string()));
                    return;
                }
            };

            while let Some(snapshot) = stream.next().await {
                match snapshot {
                    Ok(documents) => {
                        tracing::debug!("Gallery snapshot: {} items", documents.len());
                        handle.apply_snapshot(feed, &documents, retention, Utc::now());
                    }
                    Err(error) => {
                        tracing::error!("Gallery feed failed: {}", error);
                        handle.fail(feed, Error::SubscriptionFailed(error.to_string()));
                        return;
                    }
                }
            }
            tracing::warn!("Gallery feed on {} ended", namespace);
        });

        self.active = Some(ActiveFeed {
            identity,
            _task: task,
        });
    }
}
