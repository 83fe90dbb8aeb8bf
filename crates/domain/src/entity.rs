//! Core trait for persisted entities.

use common::DocumentId;
use serde::{Serialize, de::DeserializeOwned};

/// Trait for entities stored as whole documents.
///
/// An entity is read, changed in memory and written back in a single put.
/// The document body is the entity's serde representation, so every field
/// that must survive a round trip has to be serialized.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Returns the collection name the entity is stored in.
    fn collection() -> &'static str;

    /// Returns the key of this entity's document.
    fn document_id(&self) -> DocumentId;
}
