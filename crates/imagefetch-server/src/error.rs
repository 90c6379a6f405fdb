use axum::http::header::WWW_AUTHENTICATE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use imagefetch_core::ValidationError;
use thiserror::Error;

use crate::auth::AuthError;

/// Caller-visible failures of the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    InvalidQuery(#[from] ValidationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(error) => {
                tracing::debug!(%error, "rejected unauthenticated request");
                (
                    StatusCode::UNAUTHORIZED,
                    [(WWW_AUTHENTICATE, "Bearer")],
                    "Unauthorized",
                )
                    .into_response()
            }
            Self::InvalidQuery(_) => (StatusCode::BAD_REQUEST, "Query is required").into_response(),
        }
    }
}
