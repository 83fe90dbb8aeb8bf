//! Shopping cart aggregate and related types.

mod aggregate;
mod commands;
mod service;
mod value_objects;

pub use aggregate::{Cart, DISCOUNT_RATE_BPS};
pub use commands::*;
pub use service::CartService;
pub use value_objects::{
    CartLineItem, Discount, ItemId, Money, ShippingSelection, VariantSelector,
};

use thiserror::Error;

use crate::product::ProductId;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product catalog does not know the product.
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },

    /// The product has fewer units available than requested.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// No line item with this id exists in the cart.
    #[error("Item not found in cart: {item_id}")]
    ItemNotFound { item_id: ItemId },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// A monetary amount that must not be negative was negative.
    #[error("Invalid {field}: {amount} (must not be negative)")]
    NegativeAmount { field: &'static str, amount: Money },

    /// A cart total does not fit in an `i64` of cents.
    #[error("Cart {field} is out of range")]
    AmountOverflow { field: &'static str },
}
