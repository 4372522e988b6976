//! Unified error handling.
//!
//! Provides a unified `AppError` type that logs server-side failures before
//! responding. All fallible route handlers return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::store::KvError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persisting state failed.
    #[error("Store error: {0}")]
    Store(#[from] KvError),

    /// Checkout was attempted with no line items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Building a response document failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Store(_) | Self::Serialize(_)) {
            tracing::error!(error = %self, "Request error");
        }

        let status = match &self {
            Self::Store(_) | Self::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmptyCart => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) | Self::Serialize(_) => "Internal server error".to_string(),
            Self::EmptyCart => "Cart is empty.".to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
