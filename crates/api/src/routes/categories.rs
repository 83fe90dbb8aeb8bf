//! Category endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use document_store::DocumentStore;
use domain::{
    Category, CategoryDetail, CategoryId, CategoryNode, CategoryOrder, CreateCategory,
    TreeStrategy, UpdateCategory,
};
use serde::{Deserialize, Serialize};

use super::{ApiJson, parse_id};
use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    /// `roots` or `nested`; the server default applies when absent.
    pub strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub categories: Vec<CategoryOrder>,
}

#[derive(Debug, Serialize)]
pub struct PathResponse {
    pub id: String,
    pub path: String,
}

/// GET /categories: every category arranged as a tree.
#[tracing::instrument(skip(state))]
pub async fn tree<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<Vec<CategoryNode>>, ApiError> {
    let strategy = match query.strategy.as_deref() {
        Some(s) => s.parse::<TreeStrategy>().map_err(ApiError::BadRequest)?,
        None => state.tree_strategy,
    };

    let tree = state.category_service.list_tree(strategy).await?;
    Ok(Json(tree))
}

/// GET /categories/{slug}: one category with its parent and subcategories.
#[tracing::instrument(skip(state))]
pub async fn get_by_slug<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(slug): Path<String>,
) -> Result<Json<CategoryDetail>, ApiError> {
    let detail = state
        .category_service
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Category {slug} not found")))?;
    Ok(Json(detail))
}

/// POST /categories: create a category.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Category name is required".to_string()));
    }

    let category = state.category_service.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/{id}: partially update a category.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateCategory>,
) -> Result<Json<Category>, ApiError> {
    let category_id: CategoryId = parse_id("category", &id)?;
    let category = state
        .category_service
        .update_category(category_id, req)
        .await?;
    Ok(Json(category))
}

/// DELETE /categories/{id}: delete a category without subcategories.
#[tracing::instrument(skip(state))]
pub async fn delete<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let category_id: CategoryId = parse_id("category", &id)?;
    state.category_service.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /categories/reorder: set display orders in bulk.
#[tracing::instrument(skip(state, req))]
pub async fn reorder<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> Result<StatusCode, ApiError> {
    state.category_service.reorder(req.categories).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /categories/{id}/path: breadcrumb from the root, e.g. `Home > Kitchen`.
#[tracing::instrument(skip(state))]
pub async fn full_path<S: DocumentStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<PathResponse>, ApiError> {
    let category_id: CategoryId = parse_id("category", &id)?;
    let path = state.category_service.full_path(category_id).await?;
    Ok(Json(PathResponse { id, path }))
}
