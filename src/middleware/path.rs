use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::ApiError;
use crate::query::parse_id;
use crate::validation::FieldError;

/// Numeric `:id` path segment. Anything that is not an integer, including
/// segments that fail to decode, is a `VALIDATION_ERROR` on `id`.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<String>::from_request_parts(parts, state).await {
            Ok(Path(raw)) => parse_id(&raw).map(PathId),
            Err(rejection) => {
                tracing::debug!("Rejected path id: {}", rejection.body_text());
                Err(ApiError::validation_error(vec![FieldError::new("id", "id must be an integer")]))
            }
        }
    }
}
