//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use document_store::DocumentStoreError;
use domain::{CartError, CategoryError, DomainError, ProductError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The request does not identify a shopper.
    Unauthorized(String),
    /// Domain logic error.
    Domain(DomainError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        if status.is_server_error() {
            tracing::error!(error = %message, %status, "request failed");
        }
        metrics::counter!("http_errors_total", "status" => status.as_u16().to_string())
            .increment(1);

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    let status = match &err {
        DomainError::Cart(cart_err) => match cart_err {
            CartError::ProductNotFound { .. } | CartError::ItemNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            CartError::InsufficientStock { .. }
            | CartError::InvalidQuantity { .. }
            | CartError::NegativeAmount { .. }
            | CartError::AmountOverflow { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::Category(category_err) => match category_err {
            CategoryError::DuplicateSlug { .. } => StatusCode::CONFLICT,
            CategoryError::NameRequired
            | CategoryError::HasSubcategories { .. }
            | CategoryError::InvalidParent { .. }
            | CategoryError::CycleDetected { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::Product(product_err) => match product_err {
            ProductError::DuplicateSlug { .. } => StatusCode::CONFLICT,
            ProductError::NameRequired
            | ProductError::NegativePrice { .. }
            | ProductError::CategoryNotFound { .. } => StatusCode::BAD_REQUEST,
        },
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Store(DocumentStoreError::ConcurrencyConflict { .. }) => StatusCode::CONFLICT,
        DomainError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Store(_) | DomainError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
