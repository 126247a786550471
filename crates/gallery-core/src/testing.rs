//! In-memory identity provider and document store for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::auth::{
    AuthError, AuthResult, IdentityChanges, IdentityNotifier, IdentityProvider, IdentityState,
};
use crate::models::Identity;
use crate::store::{
    Document, DocumentStore, Namespace, Record, Snapshot, SnapshotStream, StoreError,
    StoreResult,
};
use crate::subscription::Subscription;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Default)]
pub struct FakeIdentityProvider {
    notifier: IdentityNotifier,
    identity: Option<Identity>,
    failure: Option<String>,
    delay: Duration,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeIdentityProvider {
    pub fn signing_in_as(id: &str) -> Self {
        Self {
            identity: Some(Identity::new(id)),
            ..Self::default()
        }
    }

    pub fn failing_with(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Sign-in completes only after `delay` of (simulated) time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Push an identity change as if the provider noticed it on its own.
    pub fn switch_to(&self, identity: Option<Identity>) {
        self.notifier.publish(match identity {
            Some(identity) => IdentityState::SignedIn(identity),
            None => IdentityState::SignedOut,
        });
    }

    pub fn calls(&self) -> Vec<String> {
        locked(&self.calls).clone()
    }

    async fn complete(&self, call: String) -> AuthResult<Identity> {
        locked(&self.calls).push(call);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match (&self.failure, &self.identity) {
            (Some(message), _) => {
                self.notifier.settle_signed_out();
                Err(AuthError::Api(message.clone()))
            }
            (None, Some(identity)) => {
                self.notifier.publish(IdentityState::SignedIn(identity.clone()));
                Ok(identity.clone())
            }
            (None, None) => {
                self.notifier.settle_signed_out();
                Err(AuthError::SignedOut)
            }
        }
    }
}

impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in_anonymously(&self) -> AuthResult<Identity> {
        self.complete("anonymous".to_string()).await
    }

    async fn sign_in_with_token(&self, token: &str) -> AuthResult<Identity> {
        self.complete(format!("token:{token}")).await
    }

    fn on_identity_changed(&self) -> IdentityChanges {
        self.notifier.subscribe()
    }
}

#[derive(Debug, Default)]
struct MemoryStoreState {
    subscribed: Vec<Namespace>,
    inserts: Vec<(Namespace, Record)>,
    documents: HashMap<Namespace, Vec<Document>>,
    feeds: Vec<(Namespace, mpsc::UnboundedSender<Snapshot>)>,
    insert_failure: Option<String>,
    next_id: u64,
}

/// Document store that delivers a snapshot on subscribe and after every
/// insert, like a live query would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryStoreState>>,
}

impl MemoryStore {
    pub fn failing_inserts(message: &str) -> Self {
        let store = Self::default();
        locked(&store.state).insert_failure = Some(message.to_string());
        store
    }

    pub fn subscribe_calls(&self) -> usize {
        locked(&self.state).subscribed.len()
    }

    pub fn subscribed_namespaces(&self) -> Vec<Namespace> {
        locked(&self.state).subscribed.clone()
    }

    pub fn inserts(&self) -> Vec<(Namespace, Record)> {
        locked(&self.state).inserts.clone()
    }

    /// Feeds on `namespace` whose consumer is still listening.
    pub fn open_feeds(&self, namespace: &Namespace) -> usize {
        locked(&self.state)
            .feeds
            .iter()
            .filter(|(feed, sender)| feed == namespace && !sender.is_closed())
            .count()
    }

    /// Replace the contents of `namespace` and notify its listeners.
    pub fn push_snapshot(&self, namespace: &Namespace, documents: Vec<Document>) {
        let mut state = locked(&self.state);
        state.documents.insert(namespace.clone(), documents.clone());
        Self::broadcast(&mut state, namespace, &documents);
    }

    /// End every feed on `namespace` with an error.
    pub fn fail_feed(&self, namespace: &Namespace, message: &str) {
        let mut state = locked(&self.state);
        state.feeds.retain(|(feed, sender)| {
            if feed == namespace {
                let _ = sender.send(Err(StoreError::Api(message.to_string())));
                false
            } else {
                true
            }
        });
    }

    fn broadcast(state: &mut MemoryStoreState, namespace: &Namespace, documents: &[Document]) {
        state.feeds.retain(|(feed, sender)| {
            feed != namespace || sender.send(Ok(documents.to_vec())).is_ok()
        });
    }
}

impl DocumentStore for MemoryStore {
    async fn subscribe(&self, namespace: &Namespace) -> StoreResult<SnapshotStream> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = locked(&self.state);
        state.subscribed.push(namespace.clone());
        let current = state.documents.get(namespace).cloned().unwrap_or_default();
        let _ = sender.send(Ok(current));
        state.feeds.push((namespace.clone(), sender));
        Ok(SnapshotStream::new(receiver, Subscription::default()))
    }

    async fn insert(&self, namespace: &Namespace, record: Record) -> StoreResult<String> {
        let mut state = locked(&self.state);
        if let Some(message) = &state.insert_failure {
            return Err(StoreError::Api(message.clone()));
        }

        state.next_id += 1;
        let id = format!("doc-{}", state.next_id);
        state.inserts.push((namespace.clone(), record.clone()));
        let documents = {
            let documents = state.documents.entry(namespace.clone()).or_default();
            documents.push(Document {
                id: id.clone(),
                fields: record,
            });
            documents.clone()
        };
        Self::broadcast(&mut state, namespace, &documents);
        Ok(id)
    }
}
