//! Product catalog trait and implementations.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use document_store::DocumentStore;

use crate::error::DomainError;
use crate::repository::Repository;

use super::{Product, ProductId, ProductSnapshot};

/// Resolves product references for the cart.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Looks up the current price and stock of a product.
    ///
    /// Returns None if the product is unknown or not for sale.
    async fn lookup(&self, product_id: ProductId) -> Result<Option<ProductSnapshot>, DomainError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, ProductSnapshot>,
    unavailable: bool,
}

/// In-memory product catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn set_product(&self, product_id: ProductId, snapshot: ProductSnapshot) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .insert(product_id, snapshot);
    }

    /// Removes a product. Returns true if it was present.
    pub fn remove_product(&self, product_id: ProductId) -> bool {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .remove(&product_id)
            .is_some()
    }

    /// Configures every following lookup to fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .unavailable = unavailable;
    }

    /// Returns the number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .products
            .len()
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn lookup(&self, product_id: ProductId) -> Result<Option<ProductSnapshot>, DomainError> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        if state.unavailable {
            return Err(DomainError::CatalogUnavailable(
                "catalog is offline".to_string(),
            ));
        }

        Ok(state.products.get(&product_id).copied())
    }
}

/// Product catalog backed by the `products` collection of a document store.
pub struct StoredProductCatalog<S: DocumentStore> {
    products: Repository<S, Product>,
}

impl<S: DocumentStore> StoredProductCatalog<S> {
    /// Creates a catalog reading from the given store.
    pub fn new(store: S) -> Self {
        Self {
            products: Repository::new(store),
        }
    }
}

#[async_trait]
impl<S: DocumentStore> ProductCatalog for StoredProductCatalog<S> {
    async fn lookup(&self, product_id: ProductId) -> Result<Option<ProductSnapshot>, DomainError> {
        let product = self.products.load(product_id).await?;
        Ok(product
            .filter(|product| product.is_active)
            .map(|product| product.snapshot()))
    }
}
