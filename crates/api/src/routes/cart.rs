//! Shopping cart endpoints.
//!
//! The shopper is identified by the `x-user-id` header.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use document_store::DocumentStore;
use domain::{
    AddCartItem, ApplyDiscount, Cart, CartLineItem, ClearCart, ItemId, Money, ProductId,
    RemoveCartItem, SetShipping, SetTax, UpdateCartItem, UserId, VariantSelector,
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, parse_id};
use crate::AppState;
use crate::error::ApiError;

/// Header carrying the shopper's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
    pub variant: Option<VariantSelector>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct DiscountRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    pub method: String,
    pub cost_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct TaxRequest {
    pub amount_cents: i64,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub owner: String,
    pub items: Vec<CartItemResponse>,
    pub discount: Option<DiscountResponse>,
    pub shipping: Option<ShippingResponse>,
    pub tax_cents: i64,
    pub subtotal_cents: i64,
    pub grand_total_cents: i64,
    pub last_recomputed: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct CartItemResponse {
    pub id: String,
    pub product_id: String,
    pub variant: Option<VariantSelector>,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct DiscountResponse {
    pub code: String,
    pub amount_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct ShippingResponse {
    pub method: String,
    pub cost_cents: i64,
}

impl TryFrom<&CartLineItem> for CartItemResponse {
    type Error = ApiError;

    fn try_from(item: &CartLineItem) -> Result<Self, Self::Error> {
        let line_total = item.line_total().ok_or_else(|| {
            ApiError::Internal(format!("Line total of cart item {} is out of range", item.id))
        })?;

        Ok(Self {
            id: item.id.to_string(),
            product_id: item.product_id.to_string(),
            variant: item.variant.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            line_total_cents: line_total.cents(),
        })
    }
}

impl TryFrom<Cart> for CartResponse {
    type Error = ApiError;

    fn try_from(cart: Cart) -> Result<Self, Self::Error> {
        let discount = cart.discount().code.clone().map(|code| DiscountResponse {
            code,
            amount_cents: cart.discount().amount.cents(),
        });
        let shipping = cart.shipping().method.clone().map(|method| ShippingResponse {
            method,
            cost_cents: cart.shipping().cost.cents(),
        });

        Ok(Self {
            owner: cart.owner().to_string(),
            items: cart
                .items()
                .iter()
                .map(CartItemResponse::try_from)
                .collect::<Result<_, _>>()?,
            discount,
            shipping,
            tax_cents: cart.tax().cents(),
            subtotal_cents: cart.subtotal().cents(),
            grand_total_cents: cart.grand_total().cents(),
            last_recomputed: cart.last_recomputed(),
        })
    }
}

// -- Handlers --

/// GET /cart: the shopper's cart, created empty on first access.
#[tracing::instrument(skip(state, headers))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let cart = state.cart_service.get_or_create(owner).await?;
    Ok(Json(cart.try_into()?))
}

/// POST /cart/items: add units of a product.
#[tracing::instrument(skip(state, headers))]
pub async fn add_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let product_id: ProductId = parse_id("product", &req.product_id)?;
    let quantity = positive_quantity(req.quantity)?;

    let mut cmd = AddCartItem::new(owner, product_id, quantity);
    if let Some(variant) = req.variant {
        cmd = cmd.with_variant(variant);
    }

    let cart = state.cart_service.add_item(cmd).await?;
    Ok(Json(cart.try_into()?))
}

/// PUT /cart/items/{item_id}: set the quantity of a line.
#[tracing::instrument(skip(state, headers))]
pub async fn update_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    ApiJson(req): ApiJson<UpdateItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let item_id: ItemId = parse_id("item", &item_id)?;
    let quantity = positive_quantity(req.quantity)?;

    let cart = state
        .cart_service
        .update_quantity(UpdateCartItem::new(owner, item_id, quantity))
        .await?;
    Ok(Json(cart.try_into()?))
}

/// DELETE /cart/items/{item_id}: remove a line.
#[tracing::instrument(skip(state, headers))]
pub async fn remove_item<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let item_id: ItemId = parse_id("item", &item_id)?;

    let cart = state
        .cart_service
        .remove_item(RemoveCartItem::new(owner, item_id))
        .await?;
    Ok(Json(cart.try_into()?))
}

/// DELETE /cart: empty the cart.
#[tracing::instrument(skip(state, headers))]
pub async fn clear<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let cart = state.cart_service.clear(ClearCart::new(owner)).await?;
    Ok(Json(cart.try_into()?))
}

/// POST /cart/discount: apply a discount code.
#[tracing::instrument(skip(state, headers))]
pub async fn apply_discount<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<DiscountRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let code = non_blank("discount code", &req.code)?;

    let cart = state
        .cart_service
        .apply_discount(ApplyDiscount::new(owner, code))
        .await?;
    Ok(Json(cart.try_into()?))
}

/// PUT /cart/shipping: choose a shipping method.
#[tracing::instrument(skip(state, headers))]
pub async fn set_shipping<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<ShippingRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let method = non_blank("shipping method", &req.method)?;
    let cost = non_negative("shipping cost", req.cost_cents)?;

    let cart = state
        .cart_service
        .set_shipping(SetShipping::new(owner, method, cost))
        .await?;
    Ok(Json(cart.try_into()?))
}

/// PUT /cart/tax: set the tax amount.
#[tracing::instrument(skip(state, headers))]
pub async fn set_tax<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    ApiJson(req): ApiJson<TaxRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let owner = owner_from_headers(&headers)?;
    let amount = non_negative("tax", req.amount_cents)?;

    let cart = state
        .cart_service
        .set_tax(SetTax::new(owner, amount))
        .await?;
    Ok(Json(cart.try_into()?))
}

fn owner_from_headers(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized(format!("Missing {USER_ID_HEADER} header")))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {USER_ID_HEADER} header")))?;
    parse_id("user", value)
}

fn positive_quantity(quantity: u32) -> Result<u32, ApiError> {
    if quantity == 0 {
        return Err(ApiError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(quantity)
}

fn non_blank(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn non_negative(field: &str, cents: i64) -> Result<Money, ApiError> {
    if cents < 0 {
        return Err(ApiError::BadRequest(format!("{field} must not be negative")));
    }
    Ok(Money::from_cents(cents))
}
