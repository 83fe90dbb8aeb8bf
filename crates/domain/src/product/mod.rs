//! Products and the catalog the cart consults for prices and stock.

mod catalog;
mod model;
mod service;

pub use catalog::{InMemoryProductCatalog, ProductCatalog, StoredProductCatalog};
pub use model::{Product, ProductId, ProductSnapshot};
pub use service::{
    CreateProduct, MAX_PAGE_SIZE, ProductFilter, ProductPage, ProductService, ProductSort,
    UpdateProduct,
};

use thiserror::Error;

use crate::cart::Money;
use crate::category::CategoryId;

/// Errors that can occur when creating or updating products.
#[derive(Debug, Error)]
pub enum ProductError {
    /// Products need a non-blank name.
    #[error("Product name is required")]
    NameRequired,

    /// Prices are never negative.
    #[error("Invalid price: {price} (must not be negative)")]
    NegativePrice { price: Money },

    /// Another product already uses the slug.
    #[error("Product slug already in use: {slug}")]
    DuplicateSlug { slug: String },

    /// The product names a category that does not exist.
    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: CategoryId },
}
