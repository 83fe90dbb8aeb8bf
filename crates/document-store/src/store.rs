use async_trait::async_trait;

use crate::{Document, DocumentId, DocumentQuery, DocumentStoreError, Result, Version};

/// Options for writing a document.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Version the writer expects the stored document to be at.
    /// If None, the write always wins (last writer wins).
    pub expected_version: Option<Version>,
}

impl PutOptions {
    /// Creates options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the document to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Creates options expecting the document to not exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// Core trait for document store implementations.
///
/// A document store keeps one JSON body per `(collection, id)` key and
/// replaces it wholesale on every put. All implementations must be
/// thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts or replaces a document.
    ///
    /// If `options.expected_version` is set, the write fails with
    /// `ConcurrencyConflict` when the stored version differs.
    ///
    /// Returns the version of the document after the write.
    async fn put(
        &self,
        collection: &str,
        id: DocumentId,
        body: serde_json::Value,
        options: PutOptions,
    ) -> Result<Version>;

    /// Fetches a document by key.
    ///
    /// Returns None if the document does not exist.
    async fn get(&self, collection: &str, id: DocumentId) -> Result<Option<Document>>;

    /// Deletes a document by key.
    ///
    /// Returns true if a document was removed.
    async fn delete(&self, collection: &str, id: DocumentId) -> Result<bool>;

    /// Retrieves the documents matching a query.
    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Checks if a document exists.
    async fn exists(&self, collection: &str, id: DocumentId) -> Result<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }

    /// Returns the stored version of a document, or None if it does not exist.
    async fn version_of(&self, collection: &str, id: DocumentId) -> Result<Option<Version>> {
        Ok(self.get(collection, id).await?.map(|doc| doc.version))
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Validates a collection name before it reaches a backend.
///
/// Names must be non-empty and made of lowercase ASCII letters, digits and
/// underscores.
pub fn validate_collection(collection: &str) -> Result<()> {
    if collection.is_empty() {
        return Err(DocumentStoreError::InvalidQuery(
            "Collection name cannot be empty".to_string(),
        ));
    }

    if !collection
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(DocumentStoreError::InvalidQuery(format!(
            "Invalid collection name: {collection}"
        )));
    }

    Ok(())
}

/// Validates that every filter names a plain top-level field.
pub fn validate_query(query: &DocumentQuery) -> Result<()> {
    validate_collection(&query.collection)?;

    for filter in &query.filters {
        if filter.field.is_empty() || filter.field.contains('.') {
            return Err(DocumentStoreError::InvalidQuery(format!(
                "Invalid filter field: '{}'",
                filter.field
            )));
        }
    }

    Ok(())
}
