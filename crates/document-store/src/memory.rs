use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    Document, DocumentId, DocumentQuery, DocumentStoreError, Result, Version,
    store::{DocumentStore, PutOptions, validate_collection, validate_query},
};

/// In-memory document store implementation for testing.
///
/// This implementation keeps every document in insertion order and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of documents stored across all collections.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Removes every document.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn put(
        &self,
        collection: &str,
        id: DocumentId,
        body: serde_json::Value,
        options: PutOptions,
    ) -> Result<Version> {
        validate_collection(collection)?;

        let mut store = self.documents.write().await;
        let now = Utc::now();

        let position = store
            .iter()
            .position(|doc| doc.collection == collection && doc.id == id);

        let current_version = position
            .and_then(|index| store.get(index))
            .map(|doc| doc.version)
            .unwrap_or(Version::initial());

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(DocumentStoreError::ConcurrencyConflict {
                collection: collection.to_string(),
                id,
                expected,
                actual: current_version,
            });
        }

        let new_version = current_version.next();
        match position.and_then(|index| store.get_mut(index)) {
            Some(doc) => {
                doc.version = new_version;
                doc.updated_at = now;
                doc.body = body;
            }
            None => store.push(Document {
                id,
                collection: collection.to_string(),
                version: new_version,
                created_at: now,
                updated_at: now,
                body,
            }),
        }

        metrics::counter!("document_store_writes_total", "collection" => collection.to_string())
            .increment(1);
        tracing::debug!(%collection, %id, version = %new_version, "document stored");

        Ok(new_version)
    }

    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>> {
        validate_collection(collection)?;

        let store = self.documents.read().await;
        Ok(store
            .iter()
            .find(|doc| doc.collection == collection && doc.id == id)
            .cloned())
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<bool> {
        validate_collection(collection)?;

        let mut store = self.documents.write().await;
        let before = store.len();
        store.retain(|doc| !(doc.collection == collection && doc.id == id));
        Ok(store.len() != before)
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        validate_query(&query)?;

        let store = self.documents.read().await;
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(store
            .iter()
            .filter(|doc| query.matches(doc))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentStoreExt;

    fn body(name: &str) -> serde_json::Value {
        serde_json::json!({ "name": name })
    }

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        let version = store
            .put("widgets", id, body("Widget"), PutOptions::new())
            .await
            .unwrap();
        assert_eq!(version, Version::first());

        let doc = store.get("widgets", id).await.unwrap().unwrap();
        assert_eq!(doc.id, id);
        assert_eq!(doc.collection, "widgets");
        assert_eq!(doc.version, Version::first());
        assert_eq!(doc.body, body("Widget"));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryDocumentStore::new();
        let result = store.get("widgets", DocumentId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn put_replaces_whole_document() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        store
            .put("widgets", id, serde_json::json!({ "name": "A", "extra": 1 }), PutOptions::new())
            .await
            .unwrap();
        let version = store
            .put("widgets", id, body("B"), PutOptions::new())
            .await
            .unwrap();

        assert_eq!(version, Version::new(2));
        let doc = store.get("widgets", id).await.unwrap().unwrap();
        assert_eq!(doc.body, body("B"));
        assert!(doc.created_at <= doc.updated_at);
        assert_eq!(store.document_count().await, 1);
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        store.put("widgets", id, body("W"), PutOptions::new()).await.unwrap();
        store.put("gadgets", id, body("G"), PutOptions::new()).await.unwrap();

        let widget = store.get("widgets", id).await.unwrap().unwrap();
        let gadget = store.get("gadgets", id).await.unwrap().unwrap();
        assert_eq!(widget.body, body("W"));
        assert_eq!(gadget.body, body("G"));
    }

    #[tokio::test]
    async fn concurrency_conflict() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        store
            .put("widgets", id, body("A"), PutOptions::expect_new())
            .await
            .unwrap();

        let result = store
            .put("widgets", id, body("B"), PutOptions::expect_new())
            .await;

        assert!(matches!(
            result,
            Err(DocumentStoreError::ConcurrencyConflict { .. })
        ));

        let doc = store.get("widgets", id).await.unwrap().unwrap();
        assert_eq!(doc.body, body("A"));
    }

    #[tokio::test]
    async fn concurrency_expected_version_success() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        store
            .put("widgets", id, body("A"), PutOptions::expect_new())
            .await
            .unwrap();
        let result = store
            .put(
                "widgets",
                id,
                body("B"),
                PutOptions::expect_version(Version::first()),
            )
            .await;

        assert_eq!(result.unwrap(), Version::new(2));
    }

    #[tokio::test]
    async fn delete_document() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        store.put("widgets", id, body("A"), PutOptions::new()).await.unwrap();

        assert!(store.delete("widgets", id).await.unwrap());
        assert!(!store.delete("widgets", id).await.unwrap());
        assert!(!store.exists("widgets", id).await.unwrap());
    }

    #[tokio::test]
    async fn query_filters_and_pagination() {
        let store = InMemoryDocumentStore::new();

        for (name, color) in [("a", "red"), ("b", "blue"), ("c", "red"), ("d", "red")] {
            store
                .put(
                    "widgets",
                    DocumentId::new(),
                    serde_json::json!({ "name": name, "color": color }),
                    PutOptions::new(),
                )
                .await
                .unwrap();
        }

        let red = store
            .query(DocumentQuery::collection("widgets").field_eq("color", "red"))
            .await
            .unwrap();
        let names: Vec<_> = red.iter().map(|d| d.body["name"].clone()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);

        let page = store
            .query(
                DocumentQuery::collection("widgets")
                    .field_eq("color", "red")
                    .offset(1)
                    .limit(1),
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].body["name"], "c");

        let all = store
            .query(DocumentQuery::collection("widgets"))
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn version_of_document() {
        let store = InMemoryDocumentStore::new();
        let id = DocumentId::new();

        assert_eq!(store.version_of("widgets", id).await.unwrap(), None);
        store.put("widgets", id, body("A"), PutOptions::new()).await.unwrap();
        store.put("widgets", id, body("B"), PutOptions::new()).await.unwrap();
        assert_eq!(
            store.version_of("widgets", id).await.unwrap(),
            Some(Version::new(2))
        );
    }

    #[tokio::test]
    async fn invalid_collection_rejected() {
        let store = InMemoryDocumentStore::new();
        let result = store
            .put("Bad Name", DocumentId::new(), body("A"), PutOptions::new())
            .await;
        assert!(matches!(result, Err(DocumentStoreError::InvalidQuery(_))));
    }
}
