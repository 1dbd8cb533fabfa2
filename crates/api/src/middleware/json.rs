//! JSON body extractor that answers malformed bodies with the API's own
//! `{"mensaje": ...}` 400 instead of axum's plain-text rejection.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in replacement for [`axum::Json`] as a request extractor.
///
/// Syntax errors, wrongly typed fields and a missing `Content-Type` all
/// become [`AppError::MalformedBody`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
