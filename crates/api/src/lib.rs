//! HTTP API server with observability for the storefront backend.
//!
//! Provides REST endpoints for shopping carts, categories and products,
//! with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use document_store::DocumentStore;
use domain::{CartService, CategoryService, ProductService, StoredProductCatalog, TreeStrategy};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S: DocumentStore> {
    pub cart_service: CartService<S, StoredProductCatalog<S>>,
    pub category_service: CategoryService<S>,
    pub product_service: ProductService<S>,

    /// Strategy used by `GET /categories` unless the request overrides it.
    pub tree_strategy: TreeStrategy,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: DocumentStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/cart",
            get(routes::cart::get::<S>).delete(routes::cart::clear::<S>),
        )
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{item_id}",
            put(routes::cart::update_item::<S>).delete(routes::cart::remove_item::<S>),
        )
        .route("/cart/discount", post(routes::cart::apply_discount::<S>))
        .route("/cart/shipping", put(routes::cart::set_shipping::<S>))
        .route("/cart/tax", put(routes::cart::set_tax::<S>))
        .route(
            "/categories",
            get(routes::categories::tree::<S>).post(routes::categories::create::<S>),
        )
        .route(
            "/categories/reorder",
            post(routes::categories::reorder::<S>),
        )
        .route(
            "/categories/{category}",
            get(routes::categories::get_by_slug::<S>)
                .put(routes::categories::update::<S>)
                .delete(routes::categories::delete::<S>),
        )
        .route(
            "/categories/{category}/path",
            get(routes::categories::full_path::<S>),
        )
        .route(
            "/products",
            get(routes::products::list::<S>).post(routes::products::create::<S>),
        )
        .route(
            "/products/{product}",
            get(routes::products::get::<S>)
                .put(routes::products::update::<S>)
                .delete(routes::products::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service sharing one document store.
pub fn create_default_state<S: DocumentStore + Clone + 'static>(
    store: S,
    tree_strategy: TreeStrategy,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        cart_service: CartService::new(store.clone(), StoredProductCatalog::new(store.clone())),
        category_service: CategoryService::new(store.clone()),
        product_service: ProductService::new(store),
        tree_strategy,
    })
}
