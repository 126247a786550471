//! Document store capability.
//!
//! The gallery reads and writes schemaless documents under a per-identity
//! namespace. [`DocumentStore`] is the narrow seam the rest of the crate
//! depends on; [`FirestoreClient`] is the Firestore-backed implementation.

mod firestore;
mod value;

use std::fmt;
use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::auth::{AuthError, AuthResult};
use crate::models::Identity;
use crate::subscription::Subscription;

pub use firestore::FirestoreClient;
pub use value::{decode_fields, encode_fields};

/// Schemaless key/value document body
pub type Record = serde_json::Map<String, serde_json::Value>;

/// A stored document with its store-assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Record,
}

/// Collection path that scopes gallery items to one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// `applications/{app_id}/users/{identity}/items`
    #[must_use]
    pub fn for_items(app_id: &str, identity: &Identity) -> Self {
        Self(format!("applications/{app_id}/users/{identity}/items"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(&'static str),
    #[error("Store HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store API error: {0}")]
    Api(String),
    #[error("Store credentials unavailable: {0}")]
    Auth(#[from] AuthError),
    #[error("Invalid store payload: {0}")]
    InvalidPayload(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One delivery from a live query: the full current listing, or the error
/// that ended the query.
pub type Snapshot = StoreResult<Vec<Document>>;

/// Live query handle. Dropping it stops delivery.
#[derive(Debug)]
pub struct SnapshotStream {
    receiver: mpsc::UnboundedReceiver<Snapshot>,
    _producer: Subscription,
}

impl SnapshotStream {
    /// Wrap a receiver together with the task feeding it, if any.
    #[must_use]
    pub fn new(receiver: mpsc::UnboundedReceiver<Snapshot>, producer: Subscription) -> Self {
        Self {
            receiver,
            _producer: producer,
        }
    }

    /// Next snapshot, or `None` once the producer has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }
}

/// Capability to query and append documents.
pub trait DocumentStore: Send + Sync + 'static {
    /// Open a live query over `namespace`.
    fn subscribe(
        &self,
        namespace: &Namespace,
    ) -> impl Future<Output = StoreResult<SnapshotStream>> + Send;

    /// Append a document and return the id the store assigned to it.
    fn insert(
        &self,
        namespace: &Namespace,
        record: Record,
    ) -> impl Future<Output = StoreResult<String>> + Send;
}

/// Source of bearer tokens for authenticated store requests.
pub trait TokenSource: Send + Sync + 'static {
    fn id_token(&self) -> impl Future<Output = AuthResult<String>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_scopes_items_per_identity() {
        let namespace = Namespace::for_items("default-app-id", &Identity::new("user-42"));
        assert_eq!(
            namespace.as_str(),
            "applications/default-app-id/users/user-42/items"
        );
    }
}
