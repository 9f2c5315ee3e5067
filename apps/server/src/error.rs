//! # Web Error Types
//!
//! Maps domain and database errors onto HTTP responses.
//!
//! ## Two Error Channels
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     How Errors Reach the User                           │
//! │                                                                         │
//! │  Write handlers (POST):                                                │
//! │    domain error ──► flash message on the session ──► 303 redirect      │
//! │    (the user lands back on a page with the message queued)             │
//! │                                                                         │
//! │  Read handlers (GET) and hard failures:                                │
//! │    WebError ──► IntoResponse ──► status + JSON {"error": ...}          │
//! │                                                                         │
//! │  MissingProfile is deliberately a 500: it is a data integrity gap,     │
//! │  not something the user can fix by navigating differently.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use souk_core::CoreError;
use souk_db::DbError;

/// Errors a handler can return directly.
#[derive(Debug, Error)]
pub enum WebError {
    /// The requested resource does not exist (or is inactive).
    #[error("{0} not found")]
    NotFound(String),

    /// No logged-in user where one is required.
    #[error("login required")]
    Unauthorized,

    /// Logged in, but not allowed to do this.
    #[error("{0}")]
    Forbidden(String),

    /// The request itself was malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Anything we cannot express to the user. Detail goes to the log,
    /// the client gets a generic message.
    #[error("internal error")]
    Internal(String),
}

/// Result type for handlers.
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::Forbidden(_) => StatusCode::FORBIDDEN,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal detail is logged, never sent to the client
        let message = match &self {
            WebError::Internal(detail) => {
                error!(detail = %detail, "Internal server error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DbError> for WebError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => WebError::NotFound(format!("{entity} {id}")),
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for WebError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ListingNotFound(id) => WebError::NotFound(format!("listing {id}")),
            CoreError::OrderNotFound(id) => WebError::NotFound(format!("order {id}")),
            CoreError::AccessDenied { .. }
            | CoreError::OwnListing { .. }
            | CoreError::NotOwner { .. } => WebError::Forbidden(err.to_string()),
            CoreError::EmptyCart
            | CoreError::InvalidTransition { .. }
            | CoreError::TransitionNotImplemented { .. }
            | CoreError::Validation(_) => WebError::BadRequest(err.to_string()),
            CoreError::MissingProfile { ref user_id } => {
                // Integrity gap: a user row without its profile row
                error!(user_id = %user_id, "User has no profile");
                WebError::Internal(err.to_string())
            }
        }
    }
}
