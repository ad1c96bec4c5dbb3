/// Request extractors that reject with [`ApiError`]
///
/// Axum's own `Query` and `Path` reject with a plain-text body; these
/// wrappers render the same failures as the JSON error format.

use crate::error::ApiError;
use axum::extract::FromRequestParts;

/// Query string extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameter extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
