//! Value objects for the cart domain.

use serde::{Deserialize, Serialize};

use crate::product::ProductId;

common::uuid_id! {
    /// Identifier of a cart line item, stable for the life of the cart.
    pub struct ItemId;
}

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Adds two amounts, or None if the sum leaves the `i64` cent range.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Money::from_cents)
    }

    /// Subtracts `rhs`, or None if the difference leaves the `i64` cent range.
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.cents.checked_sub(rhs.cents).map(Money::from_cents)
    }

    /// Multiplies by a quantity, or None on overflow.
    pub fn checked_multiply(self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Returns the given share of this amount, in basis points
    /// (1000 = 10%), rounded half away from zero to the nearest cent.
    pub fn percentage(&self, basis_points: u32) -> Money {
        let scaled = i128::from(self.cents) * i128::from(basis_points);
        let rounded = if scaled >= 0 {
            (scaled + 5_000) / 10_000
        } else {
            (scaled - 5_000) / 10_000
        };
        Money {
            cents: rounded as i64,
        }
    }

    /// Returns this amount, or zero if it is negative.
    pub fn non_negative(self) -> Money {
        self.max(Money::zero())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

/// An (attribute name, option value) pair picking one variant of a product,
/// e.g. `("size", "M")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantSelector {
    /// Variant attribute name.
    pub name: String,

    /// Selected option.
    pub option: String,
}

impl VariantSelector {
    /// Creates a new variant selector.
    pub fn new(name: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            option: option.into(),
        }
    }
}

/// Discount applied to a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Code the shopper entered, if any.
    pub code: Option<String>,

    /// Amount taken off the grand total.
    pub amount: Money,
}

/// Shipping method chosen for a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSelection {
    /// Shipping method name, if one was chosen.
    pub method: Option<String>,

    /// Shipping cost added to the grand total.
    pub cost: Money,
}

/// One (product, variant) entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Line identifier, generated when the line is created.
    pub id: ItemId,

    /// The product in this line.
    pub product_id: ProductId,

    /// Selected variant; lines without a variant only merge with each other.
    pub variant: Option<VariantSelector>,

    /// Number of units.
    pub quantity: u32,

    /// Unit price captured from the catalog when the line was last added to.
    pub unit_price: Money,
}

impl CartLineItem {
    /// Creates a new line item with a fresh id.
    pub fn new(
        product_id: ProductId,
        variant: Option<VariantSelector>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            id: ItemId::new(),
            product_id,
            variant,
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this line (quantity * unit_price), or
    /// None if it does not fit in an `i64` of cents.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }

    /// Returns true if this line holds the given product and variant.
    ///
    /// A line without a variant matches only a request without a variant.
    pub fn matches(&self, product_id: ProductId, variant: Option<&VariantSelector>) -> bool {
        self.product_id == product_id && self.variant.as_ref() == variant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.dollars(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(a.checked_sub(b), Some(Money::from_cents(500)));
        assert_eq!(b.checked_sub(a), Some(Money::from_cents(-500)));
        assert_eq!(a.checked_multiply(3), Some(Money::from_cents(3000)));
    }

    #[test]
    fn test_money_arithmetic_overflow() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MAX / 2 + 1).checked_multiply(2), None);
        assert_eq!(max.checked_multiply(1), Some(max));
    }

    #[test]
    fn test_money_percentage_rounds_half_away_from_zero() {
        assert_eq!(Money::from_cents(2500).percentage(1000).cents(), 250);
        assert_eq!(Money::from_cents(1005).percentage(1000).cents(), 101);
        assert_eq!(Money::from_cents(1004).percentage(1000).cents(), 100);
        assert_eq!(Money::from_cents(-1005).percentage(1000).cents(), -101);
        assert_eq!(Money::zero().percentage(1000), Money::zero());
    }

    #[test]
    fn test_money_non_negative() {
        assert_eq!(Money::from_cents(-5).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(5).non_negative(), Money::from_cents(5));
    }

    #[test]
    fn test_line_total() {
        let item = CartLineItem::new(ProductId::new(), None, 3, Money::from_cents(1000));
        assert_eq!(item.line_total(), Some(Money::from_cents(3000)));

        let huge = CartLineItem::new(ProductId::new(), None, u32::MAX, Money::from_cents(i64::MAX));
        assert_eq!(huge.line_total(), None);
    }

    #[test]
    fn test_line_matching_rules() {
        let product = ProductId::new();
        let medium = VariantSelector::new("size", "M");
        let large = VariantSelector::new("size", "L");

        let plain = CartLineItem::new(product, None, 1, Money::from_cents(100));
        assert!(plain.matches(product, None));
        assert!(!plain.matches(product, Some(&medium)));
        assert!(!plain.matches(ProductId::new(), None));

        let sized = CartLineItem::new(product, Some(medium.clone()), 1, Money::from_cents(100));
        assert!(sized.matches(product, Some(&medium)));
        assert!(!sized.matches(product, Some(&large)));
        assert!(!sized.matches(product, None));
    }

    #[test]
    fn test_line_item_serialization() {
        let item = CartLineItem::new(
            ProductId::new(),
            Some(VariantSelector::new("color", "red")),
            2,
            Money::from_cents(999),
        );
        let json = serde_json::to_string(&item).unwrap();
        let deserialized: CartLineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, deserialized);
    }
}
