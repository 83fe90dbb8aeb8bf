//! Cart service providing the read-modify-recompute-persist cycle for carts.

use common::UserId;
use document_store::DocumentStore;

use crate::error::DomainError;
use crate::product::{ProductCatalog, ProductId, ProductSnapshot};
use crate::repository::Repository;

use super::{
    AddCartItem, ApplyDiscount, Cart, CartError, ClearCart, RemoveCartItem, SetShipping, SetTax,
    UpdateCartItem,
};

/// Service for managing shopping carts.
///
/// Every mutating operation loads the owner's cart, applies one aggregate
/// method and writes the whole cart back once. Nothing is written when the
/// operation fails. Writes carry no expected version, so two callers mutating
/// the same cart concurrently race and the last write wins.
pub struct CartService<S: DocumentStore, C: ProductCatalog> {
    carts: Repository<S, Cart>,
    catalog: C,
}

impl<S: DocumentStore, C: ProductCatalog> CartService<S, C> {
    /// Creates a new cart service over the given store and product catalog.
    pub fn new(store: S, catalog: C) -> Self {
        Self {
            carts: Repository::new(store),
            catalog,
        }
    }

    /// Returns the owner's cart, creating and storing an empty one if none exists.
    #[tracing::instrument(skip(self))]
    pub async fn get_or_create(&self, owner: UserId) -> Result<Cart, DomainError> {
        let result = self.load_or_create(owner).await;
        record("get_or_create", &result);
        result
    }

    /// Loads the owner's cart without creating one.
    #[tracing::instrument(skip(self))]
    pub async fn get_cart(&self, owner: UserId) -> Result<Option<Cart>, DomainError> {
        self.carts.load(owner).await
    }

    /// Adds units of a product, creating the cart on first use.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, cmd: AddCartItem) -> Result<Cart, DomainError> {
        let result = self.execute_add_item(cmd).await;
        record("add_item", &result);
        result
    }

    /// Sets the quantity of one line.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(&self, cmd: UpdateCartItem) -> Result<Cart, DomainError> {
        let result = self.execute_update_quantity(cmd).await;
        record("update_quantity", &result);
        result
    }

    /// Removes one line. Removing an unknown line is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, cmd: RemoveCartItem) -> Result<Cart, DomainError> {
        let item_id = cmd.item_id;
        let result = self
            .execute(cmd.owner, |cart| {
                if !cart.remove_item(item_id)? {
                    tracing::debug!(%item_id, "item not in cart");
                }
                Ok(())
            })
            .await;
        record("remove_item", &result);
        result
    }

    /// Empties the cart.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, cmd: ClearCart) -> Result<Cart, DomainError> {
        let result = self
            .execute(cmd.owner, |cart| {
                cart.clear();
                Ok(())
            })
            .await;
        record("clear", &result);
        result
    }

    /// Applies a discount code.
    #[tracing::instrument(skip(self))]
    pub async fn apply_discount(&self, cmd: ApplyDiscount) -> Result<Cart, DomainError> {
        let ApplyDiscount { owner, code } = cmd;
        let result = self
            .execute(owner, |cart| {
                let amount = cart.apply_discount(code)?;
                tracing::info!(%owner, %amount, "discount applied");
                Ok(())
            })
            .await;
        record("apply_discount", &result);
        result
    }

    /// Chooses a shipping method.
    #[tracing::instrument(skip(self))]
    pub async fn set_shipping(&self, cmd: SetShipping) -> Result<Cart, DomainError> {
        let SetShipping {
            owner,
            method,
            cost,
        } = cmd;
        let result = self
            .execute(owner, |cart| cart.set_shipping(method, cost))
            .await;
        record("set_shipping", &result);
        result
    }

    /// Sets the tax amount.
    #[tracing::instrument(skip(self))]
    pub async fn set_tax(&self, cmd: SetTax) -> Result<Cart, DomainError> {
        let result = self
            .execute(cmd.owner, |cart| cart.set_tax(cmd.amount))
            .await;
        record("set_tax", &result);
        result
    }

    async fn load_or_create(&self, owner: UserId) -> Result<Cart, DomainError> {
        if let Some(cart) = self.carts.load(owner).await? {
            return Ok(cart);
        }

        let cart = Cart::new(owner);
        self.carts.save(&cart).await?;
        tracing::info!(%owner, "cart created");
        Ok(cart)
    }

    async fn execute_add_item(&self, cmd: AddCartItem) -> Result<Cart, DomainError> {
        let product = self.lookup(cmd.product_id).await?;

        let mut cart = self
            .carts
            .load(cmd.owner)
            .await?
            .unwrap_or_else(|| Cart::new(cmd.owner));

        cart.add_item(cmd.product_id, &product, cmd.quantity, cmd.variant)?;
        self.carts.save(&cart).await?;
        Ok(cart)
    }

    async fn execute_update_quantity(&self, cmd: UpdateCartItem) -> Result<Cart, DomainError> {
        let mut cart = self.load_existing(cmd.owner).await?;

        let product_id = cart
            .find_item(cmd.item_id)
            .map(|item| item.product_id)
            .ok_or(CartError::ItemNotFound {
                item_id: cmd.item_id,
            })?;
        let product = self.lookup(product_id).await?;

        cart.update_quantity(cmd.item_id, &product, cmd.quantity)?;
        self.carts.save(&cart).await?;
        Ok(cart)
    }

    /// Loads an existing cart, applies `f` and saves the result.
    ///
    /// The cart is not saved if `f` fails.
    async fn execute<F>(&self, owner: UserId, f: F) -> Result<Cart, DomainError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let mut cart = self.load_existing(owner).await?;
        f(&mut cart)?;
        self.carts.save(&cart).await?;
        Ok(cart)
    }

    async fn load_existing(&self, owner: UserId) -> Result<Cart, DomainError> {
        self.carts
            .load(owner)
            .await?
            .ok_or_else(|| DomainError::not_found("Cart", owner))
    }

    async fn lookup(&self, product_id: ProductId) -> Result<ProductSnapshot, DomainError> {
        self.catalog
            .lookup(product_id)
            .await?
            .ok_or_else(|| CartError::ProductNotFound { product_id }.into())
    }
}

fn record<T>(operation: &'static str, result: &Result<T, DomainError>) {
    metrics::counter!("cart_operations_total", "operation" => operation).increment(1);
    if let Err(error) = result {
        metrics::counter!("cart_operation_failures_total", "operation" => operation).increment(1);
        tracing::warn!(operation, %error, "cart operation failed");
    }
}
