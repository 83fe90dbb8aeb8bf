//! Cart commands.

use common::UserId;

use crate::product::ProductId;

use super::{ItemId, Money, VariantSelector};

/// Command to add units of a product to a shopper's cart.
#[derive(Debug, Clone)]
pub struct AddCartItem {
    /// The shopper whose cart is changed.
    pub owner: UserId,

    /// The product to add.
    pub product_id: ProductId,

    /// Units to add.
    pub quantity: u32,

    /// Selected variant, if the product has variants.
    pub variant: Option<VariantSelector>,
}

impl AddCartItem {
    /// Creates a new AddCartItem command without a variant.
    pub fn new(owner: UserId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            owner,
            product_id,
            quantity,
            variant: None,
        }
    }

    /// Sets the selected variant.
    pub fn with_variant(mut self, variant: VariantSelector) -> Self {
        self.variant = Some(variant);
        self
    }
}

/// Command to set the quantity of a cart line.
#[derive(Debug, Clone)]
pub struct UpdateCartItem {
    pub owner: UserId,
    pub item_id: ItemId,
    pub quantity: u32,
}

impl UpdateCartItem {
    /// Creates a new UpdateCartItem command.
    pub fn new(owner: UserId, item_id: ItemId, quantity: u32) -> Self {
        Self {
            owner,
            item_id,
            quantity,
        }
    }
}

/// Command to remove a cart line.
#[derive(Debug, Clone)]
pub struct RemoveCartItem {
    pub owner: UserId,
    pub item_id: ItemId,
}

impl RemoveCartItem {
    /// Creates a new RemoveCartItem command.
    pub fn new(owner: UserId, item_id: ItemId) -> Self {
        Self { owner, item_id }
    }
}

/// Command to empty a cart.
#[derive(Debug, Clone)]
pub struct ClearCart {
    pub owner: UserId,
}

impl ClearCart {
    /// Creates a new ClearCart command.
    pub fn new(owner: UserId) -> Self {
        Self { owner }
    }
}

/// Command to apply a discount code.
#[derive(Debug, Clone)]
pub struct ApplyDiscount {
    pub owner: UserId,

    /// The code the shopper entered. Any code is accepted.
    pub code: String,
}

impl ApplyDiscount {
    /// Creates a new ApplyDiscount command.
    pub fn new(owner: UserId, code: impl Into<String>) -> Self {
        Self {
            owner,
            code: code.into(),
        }
    }
}

/// Command to choose a shipping method.
#[derive(Debug, Clone)]
pub struct SetShipping {
    pub owner: UserId,
    pub method: String,
    pub cost: Money,
}

impl SetShipping {
    /// Creates a new SetShipping command.
    pub fn new(owner: UserId, method: impl Into<String>, cost: Money) -> Self {
        Self {
            owner,
            method: method.into(),
            cost,
        }
    }
}

/// Command to set the tax amount of a cart.
#[derive(Debug, Clone)]
pub struct SetTax {
    pub owner: UserId,
    pub amount: Money,
}

impl SetTax {
    /// Creates a new SetTax command.
    pub fn new(owner: UserId, amount: Money) -> Self {
        Self { owner, amount }
    }
}
