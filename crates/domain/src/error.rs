//! Domain error types.

use document_store::DocumentStoreError;
use thiserror::Error;

use crate::cart::CartError;
use crate::category::CategoryError;
use crate::product::ProductError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the document store.
    #[error("Document store error: {0}")]
    Store(#[from] DocumentStoreError),

    /// A cart operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A category operation was rejected.
    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    /// A product operation was rejected.
    #[error("Product error: {0}")]
    Product(#[from] ProductError),

    /// Entity not found.
    #[error("{entity_type} not found: {entity_id}")]
    NotFound {
        entity_type: &'static str,
        entity_id: String,
    },

    /// The product catalog could not answer a lookup.
    #[error("Product catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Builds a `NotFound` error for the given entity.
    pub fn not_found(entity_type: &'static str, entity_id: impl std::fmt::Display) -> Self {
        DomainError::NotFound {
            entity_type,
            entity_id: entity_id.to_string(),
        }
    }
}
