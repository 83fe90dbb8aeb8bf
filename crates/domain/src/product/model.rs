use chrono::{DateTime, Utc};
use common::DocumentId;
use serde::{Deserialize, Serialize};

use crate::cart::{CartError, Money};
use crate::category::CategoryId;
use crate::entity::Entity;

common::uuid_id! {
    /// Unique identifier for a product.
    pub struct ProductId;
}

/// A product offered in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,

    /// URL-safe form of the name.
    pub slug: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Category the product is listed under.
    #[serde(default)]
    pub category: Option<CategoryId>,

    #[serde(default)]
    pub brand: Option<String>,

    /// Current unit price.
    pub price: Money,

    /// Units available for sale.
    pub stock: u32,

    /// Inactive products cannot be added to carts.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Entity for Product {
    fn collection() -> &'static str {
        "products"
    }

    fn document_id(&self) -> DocumentId {
        self.id.into()
    }
}

impl Product {
    /// Returns the view of this product the cart works with.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            price: self.price,
            available_stock: self.stock,
        }
    }
}

/// Price and stock of a product at the moment of a catalog lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub price: Money,
    pub available_stock: u32,
}

impl ProductSnapshot {
    /// Creates a new snapshot.
    pub fn new(price: Money, available_stock: u32) -> Self {
        Self {
            price,
            available_stock,
        }
    }

    /// Fails with `InsufficientStock` if fewer than `requested` units are available.
    pub fn ensure_available(&self, product_id: ProductId, requested: u32) -> Result<(), CartError> {
        if self.available_stock < requested {
            return Err(CartError::InsufficientStock {
                product_id,
                requested,
                available: self.available_stock,
            });
        }
        Ok(())
    }
}
