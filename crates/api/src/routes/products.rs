//! Product endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use document_store::DocumentStore;
use domain::{
    CategoryId, CreateProduct, Money, Product, ProductFilter, ProductId, ProductPage, ProductSort,
    UpdateProduct,
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, parse_id};
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_cents: i64,
    pub stock: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_cents: i64,
    pub stock: u32,
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total_products: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            slug: product.slug,
            description: product.description,
            category: product.category.map(|id| id.to_string()),
            brand: product.brand,
            price_cents: product.price.cents(),
            stock: product.stock,
            is_active: product.is_active,
        }
    }
}

impl From<ProductPage> for ProductListResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            products: page.products.into_iter().map(ProductResponse::from).collect(),
            total_products: page.total_products,
            total_pages: page.total_pages,
            current_page: page.current_page,
        }
    }
}

// -- Handlers --

/// GET /products: one page of active products.
#[tracing::instrument(skip(state))]
pub async fn list<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let defaults = ProductFilter::default();
    let filter = ProductFilter {
        category: parse_category(query.category.as_deref())?,
        brand: query.brand,
        min_price: query.min_price_cents.map(Money::from_cents),
        max_price: query.max_price_cents.map(Money::from_cents),
        in_stock: query.in_stock.unwrap_or(false),
        sort: match query.sort.as_deref() {
            Some(s) => s.parse::<ProductSort>().map_err(ApiError::BadRequest)?,
            None => defaults.sort,
        },
        page: query.page.unwrap_or(defaults.page),
        limit: query.limit.unwrap_or(defaults.limit),
    };

    let page = state.product_service.list_products(filter).await?;
    Ok(Json(page.into()))
}

/// POST /products: create a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let mut cmd = CreateProduct::new(req.name, Money::from_cents(req.price_cents), req.stock);
    if let Some(description) = req.description {
        cmd = cmd.with_description(description);
    }
    if let Some(category) = parse_category(req.category.as_deref())? {
        cmd = cmd.with_category(category);
    }
    if let Some(brand) = req.brand {
        cmd = cmd.with_brand(brand);
    }

    let product = state.product_service.create_product(cmd).await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// GET /products/{product}: load a product by ID or slug.
#[tracing::instrument(skip(state))]
pub async fn get<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(product): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let by_id = match product.parse::<ProductId>() {
        Ok(product_id) => state.product_service.get_product(product_id).await?,
        Err(_) => None,
    };
    let found = match by_id {
        Some(found) => Some(found),
        None => state.product_service.get_by_slug(&product).await?,
    };

    let found = found.ok_or_else(|| ApiError::NotFound(format!("Product {product} not found")))?;
    Ok(Json(found.into()))
}

/// PUT /products/{id}: partially update a product.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product_id: ProductId = parse_id("product", &id)?;
    let cmd = UpdateProduct {
        name: req.name,
        description: req.description,
        category: parse_category(req.category.as_deref())?,
        brand: req.brand,
        price: req.price_cents.map(Money::from_cents),
        stock: req.stock,
        is_active: req.is_active,
    };

    let product = state
        .product_service
        .update_product(product_id, cmd)
        .await?;
    Ok(Json(product.into()))
}

/// DELETE /products/{id}: delete a product.
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let product_id: ProductId = parse_id("product", &id)?;
    state.product_service.delete_product(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_category(category: Option<&str>) -> Result<Option<CategoryId>, ApiError> {
    category.map(|id| parse_id("category", id)).transpose()
}
