//! # HTTP Routes
//!
//! Route table and shared handler helpers.
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Souk Market Routes                             │
//! │                                                                         │
//! │  Accounts        POST /accounts/register  POST /accounts/login          │
//! │                  POST /accounts/logout                                  │
//! │                                                                         │
//! │  Catalog         GET  /listings           GET  /listings/:id            │
//! │                  POST /listings           POST /listings/:id/edit       │
//! │                  POST /listings/:id/delete                              │
//! │                                                                         │
//! │  Cart            GET  /cart               POST /cart/add/:listing_id    │
//! │                  POST /cart/clear         POST /cart/checkout           │
//! │                                                                         │
//! │  Orders          POST /orders/:id/confirm                               │
//! │                  GET  /dashboard/buyer    GET  /dashboard/seller        │
//! │                  GET  /dashboard/admin                                  │
//! │                                                                         │
//! │  Engagement      GET+POST /listings/:id/messages                        │
//! │                  POST /listings/:id/comments                            │
//! │                                                                         │
//! │  Writes answer with 303 + flash; reads answer with JSON.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod accounts;
pub mod cart;
pub mod engagement;
pub mod listings;
pub mod orders;

use std::sync::Arc;

use axum::middleware;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Router;
use tower_http::trace::TraceLayer;

use souk_core::{Profile, User};

use crate::error::{WebError, WebResult};
use crate::session::{session_middleware, Flash, SessionId};
use crate::state::AppState;

/// Builds the application router with all routes and layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(accounts::routes())
        .merge(listings::routes())
        .merge(cart::routes())
        .merge(orders::routes())
        .merge(engagement::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Queues a flash and answers with a 303 redirect.
pub(crate) fn flash_redirect(
    state: &AppState,
    sid: &SessionId,
    flash: Flash,
    to: &str,
) -> Response {
    state.sessions.push_flash(&sid.0, flash);
    Redirect::to(to).into_response()
}

/// Loads the logged-in user and their profile, if any.
pub(crate) async fn current_user(
    state: &AppState,
    sid: &SessionId,
) -> WebResult<Option<(User, Option<Profile>)>> {
    let Some(user_id) = state.sessions.user_id(&sid.0) else {
        return Ok(None);
    };

    let Some(user) = state.db.users().get_by_id(&user_id).await? else {
        // Session points at a deleted account; treat as logged out
        state.sessions.logout(&sid.0);
        return Ok(None);
    };

    let profile = state.db.users().get_profile(&user.id).await?;
    Ok(Some((user, profile)))
}

/// Like [`current_user`], but an anonymous visitor gets a flash and a
/// redirect to the login page instead.
pub(crate) async fn require_login(
    state: &AppState,
    sid: &SessionId,
) -> Result<(User, Option<Profile>), Response> {
    match current_user(state, sid).await {
        Ok(Some(pair)) => Ok(pair),
        Ok(None) => Err(flash_redirect(
            state,
            sid,
            Flash::error("Please log in to continue"),
            "/accounts/login",
        )),
        Err(err) => Err(err.into_response()),
    }
}

/// Converts the integrity-gap case (user without profile) into a hard
/// error for routes that must have a role to proceed.
pub(crate) fn profile_or_gap(user: &User, profile: Option<Profile>) -> WebResult<Profile> {
    profile.ok_or_else(|| {
        WebError::from(souk_core::CoreError::MissingProfile {
            user_id: user.id.clone(),
        })
    })
}
