//! Typed access to entities in a document store.

use std::marker::PhantomData;

use common::DocumentId;
use document_store::{Document, DocumentQuery, DocumentStore, PutOptions, Version};

use crate::entity::Entity;
use crate::error::DomainError;

/// Repository for loading and saving one entity type.
///
/// The repository is responsible for:
/// 1. Mapping the entity to its collection and document key
/// 2. Serializing the entity into the document body on save
/// 3. Deserializing documents back into entities on load
pub struct Repository<S, E>
where
    S: DocumentStore,
    E: Entity,
{
    store: S,
    _phantom: PhantomData<E>,
}

impl<S, E> Repository<S, E>
where
    S: DocumentStore,
    E: Entity,
{
    /// Creates a new repository over the given document store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an entity, returning None if it doesn't exist.
    pub async fn load(&self, id: impl Into<DocumentId>) -> Result<Option<E>, DomainError> {
        match self.store.get(E::collection(), id.into()).await? {
            Some(document) => Ok(Some(document.into_body()?)),
            None => Ok(None),
        }
    }

    /// Writes the entity, replacing any stored copy.
    ///
    /// No version check is made: concurrent writers to the same document
    /// race and the last write wins.
    pub async fn save(&self, entity: &E) -> Result<Version, DomainError> {
        self.put(entity, PutOptions::new()).await
    }

    /// Writes the entity only if no document exists under its key yet.
    pub async fn insert(&self, entity: &E) -> Result<Version, DomainError> {
        self.put(entity, PutOptions::expect_new()).await
    }

    /// Deletes an entity by key.
    ///
    /// Returns true if a document was removed.
    pub async fn delete(&self, id: impl Into<DocumentId>) -> Result<bool, DomainError> {
        Ok(self.store.delete(E::collection(), id.into()).await?)
    }

    /// Loads every entity whose top-level `field` equals `value`.
    pub async fn find_by(
        &self,
        field: &str,
        value: impl Into<serde_json::Value>,
    ) -> Result<Vec<E>, DomainError> {
        let query = DocumentQuery::collection(E::collection()).field_eq(field, value);
        self.find(query).await
    }

    /// Loads every entity whose top-level fields equal all of the given values.
    pub async fn find_matching<'a>(
        &self,
        fields: impl IntoIterator<Item = (&'a str, serde_json::Value)>,
    ) -> Result<Vec<E>, DomainError> {
        let query = fields
            .into_iter()
            .fold(DocumentQuery::collection(E::collection()), |query, (field, value)| {
                query.field_eq(field, value)
            });
        self.find(query).await
    }

    /// Loads every entity in the collection, in creation order.
    pub async fn all(&self) -> Result<Vec<E>, DomainError> {
        self.find(DocumentQuery::collection(E::collection())).await
    }

    async fn find(&self, query: DocumentQuery) -> Result<Vec<E>, DomainError> {
        let documents = self.store.query(query).await?;
        documents
            .into_iter()
            .map(|document: Document| document.into_body().map_err(DomainError::from))
            .collect()
    }

    async fn put(&self, entity: &E, options: PutOptions) -> Result<Version, DomainError> {
        let body = serde_json::to_value(entity)?;
        let version = self
            .store
            .put(E::collection(), entity.document_id(), body, options)
            .await?;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store::{DocumentStoreError, InMemoryDocumentStore};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: DocumentId,
        topic: String,
        text: String,
    }

    impl Entity for Note {
        fn collection() -> &'static str {
            "notes"
        }

        fn document_id(&self) -> DocumentId {
            self.id
        }
    }

    fn note(topic: &str, text: &str) -> Note {
        Note {
            id: DocumentId::new(),
            topic: topic.to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn save_and_load() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        let n = note("a", "first");

        let version = repo.save(&n).await.unwrap();
        assert_eq!(version, Version::first());

        let loaded = repo.load(n.id).await.unwrap();
        assert_eq!(loaded, Some(n));
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        assert!(repo.load(DocumentId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_overwrites() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        let mut n = note("a", "first");
        repo.save(&n).await.unwrap();

        n.text = "second".to_string();
        let version = repo.save(&n).await.unwrap();

        assert_eq!(version, Version::new(2));
        assert_eq!(repo.load(n.id).await.unwrap().unwrap().text, "second");
    }

    #[tokio::test]
    async fn insert_rejects_existing_key() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        let n = note("a", "first");
        repo.insert(&n).await.unwrap();

        let result = repo.insert(&n).await;
        assert!(matches!(
            result,
            Err(DomainError::Store(DocumentStoreError::ConcurrencyConflict { .. }))
        ));
    }

    #[tokio::test]
    async fn find_by_field_and_all() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        repo.save(&note("a", "1")).await.unwrap();
        repo.save(&note("b", "2")).await.unwrap();
        repo.save(&note("a", "3")).await.unwrap();

        let a: Vec<_> = repo
            .find_by("topic", "a")
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect();
        assert_eq!(a, vec!["1", "3"]);
        assert_eq!(repo.all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn find_matching_requires_every_field() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        repo.save(&note("a", "1")).await.unwrap();
        repo.save(&note("a", "2")).await.unwrap();
        repo.save(&note("b", "1")).await.unwrap();

        let found = repo
            .find_matching([("topic", serde_json::json!("a")), ("text", serde_json::json!("1"))])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].topic, "a");

        let everything = repo
            .find_matching(Vec::<(&str, serde_json::Value)>::new())
            .await
            .unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn delete_entity() {
        let repo: Repository<_, Note> = Repository::new(InMemoryDocumentStore::new());
        let n = note("a", "1");
        repo.save(&n).await.unwrap();

        assert!(repo.delete(n.id).await.unwrap());
        assert!(repo.load(n.id).await.unwrap().is_none());
    }
}
