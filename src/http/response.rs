//! Error responses.
//!
//! Handlers return [`AppError`]; its response carries a generic body and the
//! full detail in an [`ErrorDetail`] extension. The verbose reporter
//! (mounted outside production only) swaps the detail into the body.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body sent when detail must not leak.
pub const GENERIC_ERROR: &str = "Internal Server Error";

/// Failures a handler can surface to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to render view: {0}")]
    Render(#[from] fmt::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Diagnostic text attached to a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let detail = format!("{self:?}: {self}");
        tracing::error!(error = %self, "Request failed");

        let mut response = (self.status(), GENERIC_ERROR).into_response();
        response.extensions_mut().insert(ErrorDetail(detail));
        response
    }
}
