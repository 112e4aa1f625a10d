/// Extractors whose rejections render as [`ApiError`]
///
/// Axum's own `Json` and `Query` reject with plain-text bodies; these wrappers
/// keep malformed input in the same JSON error format as everything else.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// `axum::Json` with an `ApiError` rejection
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `axum::extract::Query` with an `ApiError` rejection
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
