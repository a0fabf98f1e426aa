//! Integer id path parameter extractor.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};

/// Extractor for a single integer id path segment.
///
/// A segment that is not a valid `i32` matches no resource, so it is
/// answered with 404 rather than 400.
///
/// # Example
/// ```ignore
/// use axum::Router;
/// use axum::routing::get;
/// use axum_helpers::extractors::IdPath;
///
/// async fn show(IdPath(id): IdPath) -> String {
///     format!("Task {}", id)
/// }
///
/// let app = Router::new().route("/update/{id}/", get(show));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i32);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        raw.parse::<i32>()
            .map(IdPath)
            .map_err(|_| AppError::NotFound(format!("No resource with id '{}'", raw)).into_response())
    }
}
