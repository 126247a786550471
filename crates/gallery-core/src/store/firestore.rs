//! Firestore document store over the REST API.
//!
//! The REST surface has no streaming listener, so live queries poll the
//! collection and emit a snapshot only when the listing changes.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::mpsc;

use super::value::{decode_fields, encode_fields};
use super::{
    Document, DocumentStore, Namespace, Record, Snapshot, SnapshotStream, StoreError,
    StoreResult, TokenSource,
};
use crate::auth::firebase_api_error;
use crate::subscription::Subscription;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const LIST_PAGE_SIZE: &str = "300";

pub struct FirestoreClient<T> {
    documents_url: String,
    client: Client,
    tokens: Arc<T>,
    poll_interval: Duration,
}

impl<T> Clone for FirestoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            documents_url: self.documents_url.clone(),
            client: self.client.clone(),
            tokens: Arc::clone(&self.tokens),
            poll_interval: self.poll_interval,
        }
    }
}

impl<T: TokenSource> FirestoreClient<T> {
    pub fn new(project_id: &str, tokens: Arc<T>, poll_interval: Duration) -> StoreResult<Self> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "Firebase project id must not be empty",
            ));
        }
        if poll_interval.is_zero() {
            return Err(StoreError::InvalidConfiguration(
                "poll interval must be greater than zero",
            ));
        }

        Ok(Self {
            documents_url: format!("{FIRESTORE_URL}/projects/{project_id}/databases/(default)/documents"),
            client: Client::builder().build()?,
            tokens,
            poll_interval,
        })
    }

    /// Every document directly under `namespace`, following pagination.
    pub async fn list(&self, namespace: &Namespace) -> StoreResult<Vec<Document>> {
        let url = self.collection_url(namespace);
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("pageSize", LIST_PAGE_SIZE)]);
            if let Some(token) = page_token.as_deref() {
                request = request.query(&[("pageToken", token)]);
            }

            let page: ListResponse = self.send(request).await?;
            for raw in page.documents {
                documents.push(raw.into_document()?);
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    fn collection_url(&self, namespace: &Namespace) -> String {
        format!("{}/{}", self.documents_url, namespace.as_str())
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<R> {
        let id_token = self.tokens.id_token().await?;
        let response = request.bearer_auth(id_token).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api(firebase_api_error(status, &body)));
        }
        Ok(response.json::<R>().await?)
    }
}

impl<T: TokenSource> DocumentStore for FirestoreClient<T> {
    async fn subscribe(&self, namespace: &Namespace) -> StoreResult<SnapshotStream> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let client = self.clone();
        let listed = namespace.clone();
        let list = move || {
            let client = client.clone();
            let namespace = listed.clone();
            async move { client.list(&namespace).await }
        };
        let producer = Subscription::spawn(poll_collection(
            list,
            namespace.clone(),
            self.poll_interval,
            sender,
        ));
        tracing::debug!("Polling {} every {:?}", namespace, self.poll_interval);
        Ok(SnapshotStream::new(receiver, producer))
    }

    async fn insert(&self, namespace: &Namespace, record: Record) -> StoreResult<String> {
        let body = serde_json::json!({ "fields": encode_fields(&record) });
        let created: RawDocument = self
            .send(self.client.post(self.collection_url(namespace)).json(&body))
            .await?;
        Ok(created.into_document()?.id)
    }
}

/// Re-list `namespace` every `poll_interval`, sending only listings that
/// differ from the last one sent. The first error is sent and ends the feed.
async fn poll_collection<L, F>(
    mut list: L,
    namespace: Namespace,
    poll_interval: Duration,
    sender: mpsc::UnboundedSender<Snapshot>,
) where
    L: FnMut() -> F,
    F: Future<Output = StoreResult<Vec<Document>>>,
{
    let mut last_delivered: Option<Vec<Document>> = None;

    loop {
        match list().await {
            Ok(documents) => {
                if last_delivered.as_ref() != Some(&documents) {
                    tracing::debug!("{} changed: {} documents", namespace, documents.len());
                    if sender.send(Ok(documents.clone())).is_err() {
                        return;
                    }
                    last_delivered = Some(documents);
                }
            }
            Err(error) => {
                tracing::error!("Polling {} failed: {}", namespace, error);
                let _ = sender.send(Err(error));
                return;
            }
        }

        tokio::time::sleep(poll_interval).await;
        if sender.is_closed() {
            tracing::debug!("Stopped polling {}", namespace);
            return;
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl RawDocument {
    /// The document id is the last segment of its resource name.
    fn into_document(self) -> StoreResult<Document> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| {
                StoreError::InvalidPayload(format!("document name '{}' has no id", self.name))
            })?
            .to_string();
        Ok(Document {
            id,
            fields: decode_fields(&self.fields),
        })
    }
}
