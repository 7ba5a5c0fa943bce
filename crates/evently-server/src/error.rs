//! HTTP error mapping.
//!
//! Every handler returns [`ApiError`]; the `IntoResponse` impl turns it into
//! a `{"detail": ...}` JSON body with the status the underlying error
//! prescribes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use evently_core::EventError;
use evently_providers::OAuthError;

/// An error answered to an HTTP client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A failure in the OAuth grant or callback flow.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// A failure in the event domain.
    #[error(transparent)]
    Event(#[from] EventError),

    /// The URL names a provider that is not registered.
    #[error("no provider registered under `{0}`")]
    UnknownProvider(String),
}

impl ApiError {
    /// Returns the HTTP status this error answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::OAuth(err) => StatusCode::from_u16(err.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Event(err) => match err {
                EventError::NotFound(_) => StatusCode::NOT_FOUND,
                EventError::Duplicate(_) => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::UnknownProvider(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// A specialized Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;
