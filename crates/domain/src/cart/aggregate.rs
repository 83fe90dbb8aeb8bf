//! Cart aggregate implementation.

use chrono::{DateTime, Utc};
use common::{DocumentId, UserId};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::product::{ProductId, ProductSnapshot};

use super::{
    CartError, CartLineItem, Discount, ItemId, Money, ShippingSelection, VariantSelector,
};

/// Share of the subtotal granted by any discount code, in basis points.
pub const DISCOUNT_RATE_BPS: u32 = 1_000;

/// Cart aggregate root.
///
/// `subtotal` and `grand_total` are derived from the line items, discount,
/// shipping and tax. Every mutating method recomputes them before it returns
/// and leaves the cart untouched when it fails, so a cart handed out by this
/// type never carries stale totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Shopper who owns the cart. Also the document key.
    owner: UserId,

    /// Line items in insertion order.
    items: Vec<CartLineItem>,

    #[serde(default)]
    discount: Discount,

    #[serde(default)]
    shipping: ShippingSelection,

    #[serde(default)]
    tax: Money,

    /// Σ unit_price × quantity.
    subtotal: Money,

    /// subtotal + shipping + tax − discount, never below zero.
    grand_total: Money,

    /// When the totals were last recomputed.
    last_recomputed: DateTime<Utc>,
}

impl Entity for Cart {
    fn collection() -> &'static str {
        "carts"
    }

    fn document_id(&self) -> DocumentId {
        self.owner.into()
    }
}

// Query methods
impl Cart {
    /// Creates an empty cart with every amount at zero.
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            items: Vec::new(),
            discount: Discount::default(),
            shipping: ShippingSelection::default(),
            tax: Money::zero(),
            subtotal: Money::zero(),
            grand_total: Money::zero(),
            last_recomputed: Utc::now(),
        }
    }

    /// Returns the owner.
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Returns a line item by id.
    pub fn find_item(&self, item_id: ItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Returns true if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn discount(&self) -> &Discount {
        &self.discount
    }

    pub fn shipping(&self) -> &ShippingSelection {
        &self.shipping
    }

    pub fn tax(&self) -> Money {
        self.tax
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn last_recomputed(&self) -> DateTime<Utc> {
        self.last_recomputed
    }
}

// Command methods
impl Cart {
    /// Adds units of a product to the cart.
    ///
    /// A line with the same product and variant absorbs the quantity and takes
    /// the product's current price; otherwise a new line is appended with the
    /// current price. Returns the id of the line that was created or updated.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        product: &ProductSnapshot,
        quantity: u32,
        variant: Option<VariantSelector>,
    ) -> Result<ItemId, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        product.ensure_available(product_id, quantity)?;

        self.transact(|cart| {
            match cart
                .items
                .iter_mut()
                .find(|item| item.matches(product_id, variant.as_ref()))
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(quantity)
                        .ok_or(CartError::InvalidQuantity { quantity })?;
                    existing.unit_price = product.price;
                    Ok(existing.id)
                }
                None => {
                    let item = CartLineItem::new(product_id, variant, quantity, product.price);
                    let id = item.id;
                    cart.items.push(item);
                    Ok(id)
                }
            }
        })
    }

    /// Sets the quantity of an existing line. No merging takes place.
    pub fn update_quantity(
        &mut self,
        item_id: ItemId,
        product: &ProductSnapshot,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        self.transact(|cart| {
            let item = cart
                .items
                .iter_mut()
                .find(|item| item.id == item_id)
                .ok_or(CartError::ItemNotFound { item_id })?;

            product.ensure_available(item.product_id, quantity)?;
            item.quantity = quantity;
            Ok(())
        })
    }

    /// Removes a line if present.
    ///
    /// Returns true if a line was removed. An unknown id leaves the items
    /// untouched.
    pub fn remove_item(&mut self, item_id: ItemId) -> Result<bool, CartError> {
        self.transact(|cart| {
            let before = cart.items.len();
            cart.items.retain(|item| item.id != item_id);
            Ok(cart.items.len() != before)
        })
    }

    /// Empties the cart and resets discount, shipping, tax and totals.
    pub fn clear(&mut self) {
        *self = Cart::new(self.owner);
    }

    /// Applies a discount code.
    ///
    /// Every code is worth a flat [`DISCOUNT_RATE_BPS`] of the current
    /// subtotal; the amount is fixed at the time of application.
    pub fn apply_discount(&mut self, code: impl Into<String>) -> Result<Money, CartError> {
        self.transact(|cart| {
            let amount = cart.subtotal.percentage(DISCOUNT_RATE_BPS);
            cart.discount = Discount {
                code: Some(code.into()),
                amount,
            };
            Ok(amount)
        })
    }

    /// Stores the shipping method and cost.
    pub fn set_shipping(&mut self, method: impl Into<String>, cost: Money) -> Result<(), CartError> {
        if cost.is_negative() {
            return Err(CartError::NegativeAmount {
                field: "shipping cost",
                amount: cost,
            });
        }

        self.transact(|cart| {
            cart.shipping = ShippingSelection {
                method: Some(method.into()),
                cost,
            };
            Ok(())
        })
    }

    /// Sets the tax amount.
    pub fn set_tax(&mut self, amount: Money) -> Result<(), CartError> {
        if amount.is_negative() {
            return Err(CartError::NegativeAmount {
                field: "tax",
                amount,
            });
        }

        self.transact(|cart| {
            cart.tax = amount;
            Ok(())
        })
    }

    /// Recomputes subtotal and grand total from the current state.
    ///
    /// Fails with [`CartError::AmountOverflow`] if a line total, the subtotal
    /// or the grand total leaves the `i64` cent range; the stored totals are
    /// left as they were.
    pub fn recompute_totals(&mut self) -> Result<(), CartError> {
        let subtotal = self
            .items
            .iter()
            .try_fold(Money::zero(), |acc, item| {
                item.line_total().and_then(|line| acc.checked_add(line))
            })
            .ok_or(CartError::AmountOverflow { field: "subtotal" })?;

        let grand_total = subtotal
            .checked_add(self.shipping.cost)
            .and_then(|total| total.checked_add(self.tax))
            .and_then(|total| total.checked_sub(self.discount.amount))
            .ok_or(CartError::AmountOverflow {
                field: "grand total",
            })?;

        self.subtotal = subtotal;
        self.grand_total = grand_total.non_negative();
        self.last_recomputed = Utc::now();
        Ok(())
    }

    /// Applies `change` to a copy of the cart and keeps the copy only if the
    /// change and the recomputed totals both succeed.
    fn transact<T>(
        &mut self,
        change: impl FnOnce(&mut Cart) -> Result<T, CartError>,
    ) -> Result<T, CartError> {
        let mut next = self.clone();
        let output = change(&mut next)?;
        next.recompute_totals()?;
        *self = next;
        Ok(output)
    }
}
