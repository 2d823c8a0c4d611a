use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` for request bodies, with parse failures answered as a 400
/// `{"error": ...}` instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
