//! HTTP route handlers.

pub mod cart;
pub mod categories;
pub mod health;
pub mod metrics;
pub mod products;

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;

/// JSON body extractor whose rejections use the API's error body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Parses a UUID path segment into one of the domain identifier types.
fn parse_id<T: From<uuid::Uuid>>(kind: &str, id: &str) -> Result<T, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {kind} ID format: {e}")))?;
    Ok(T::from(uuid))
}
