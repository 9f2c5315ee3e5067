//! # Engagement Routes
//!
//! Per-listing messages and star-rated comments.
//!
//! Messages default to the seller as recipient; a seller replying on
//! their own listing has to name who they are answering. Comments take a
//! content + rating pair from any logged-in account.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use souk_core::validation;

use crate::error::{WebError, WebResult};
use crate::routes::{flash_redirect, require_login};
use crate::session::{Flash, SessionId};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/listings/:id/messages",
            get(listing_messages).post(post_message),
        )
        .route("/listings/:id/comments", post(post_comment))
}

// =============================================================================
// Messages
// =============================================================================

/// GET /listings/:id/messages
///
/// A participant sees only the thread they are part of.
async fn listing_messages(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
) -> Response {
    let (user, _) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    match messages_body(&state, &sid, &id, &user.id).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn messages_body(
    state: &AppState,
    sid: &SessionId,
    listing_id: &str,
    user_id: &str,
) -> WebResult<serde_json::Value> {
    // The listing may be inactive; existing threads stay readable
    let listing = state
        .db
        .listings()
        .get_by_id(listing_id)
        .await?
        .ok_or_else(|| WebError::NotFound(format!("listing {listing_id}")))?;

    let messages = state
        .db
        .messages()
        .list_for_listing_involving(&listing.id, user_id)
        .await?;
    let flashes = state.sessions.take_flashes(&sid.0);

    Ok(json!({
        "listing_id": listing.id,
        "messages": messages,
        "flashes": flashes,
    }))
}

#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub content: String,
    /// Required only when the sender is the listing's own seller.
    pub recipient_id: Option<String>,
}

/// POST /listings/:id/messages
async fn post_message(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
    Form(form): Form<MessageForm>,
) -> Response {
    let (user, _) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let listing = match state.db.listings().get_active(&id).await {
        Ok(Some(listing)) => listing,
        Ok(None) => {
            return flash_redirect(
                &state,
                &sid,
                Flash::error("That listing is no longer available"),
                "/listings",
            )
        }
        Err(e) => return WebError::from(e).into_response(),
    };

    let back = format!("/listings/{id}/messages");

    let content = match validation::validate_content(&form.content) {
        Ok(clean) => clean,
        Err(e) => return flash_redirect(&state, &sid, Flash::error(e.to_string()), &back),
    };

    // Buyers message the seller; the seller must say who they answer
    let recipient_id = if listing.is_owned_by(&user.id) {
        match form.recipient_id.as_deref().map(str::trim) {
            Some(recipient) if !recipient.is_empty() && recipient != user.id => {
                recipient.to_string()
            }
            _ => {
                return flash_redirect(
                    &state,
                    &sid,
                    Flash::error("Choose who to reply to on your own listing"),
                    &back,
                )
            }
        }
    } else {
        listing.seller_id.clone()
    };

    match state
        .db
        .messages()
        .insert(&listing.id, &user.id, &recipient_id, &content)
        .await
    {
        Ok(message) => {
            info!(message_id = %message.id, listing_id = %listing.id, "Message sent");
            flash_redirect(&state, &sid, Flash::success("Message sent"), &back)
        }
        Err(e) => WebError::from(e).into_response(),
    }
}

// =============================================================================
// Comments
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub content: String,
    pub rating: i64,
}

/// POST /listings/:id/comments
async fn post_comment(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Response {
    let (user, _) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let listing = match state.db.listings().get_active(&id).await {
        Ok(Some(listing)) => listing,
        Ok(None) => {
            return flash_redirect(
                &state,
                &sid,
                Flash::error("That listing is no longer available"),
                "/listings",
            )
        }
        Err(e) => return WebError::from(e).into_response(),
    };

    let back = format!("/listings/{id}");

    let content = match validation::validate_content(&form.content) {
        Ok(clean) => clean,
        Err(e) => return flash_redirect(&state, &sid, Flash::error(e.to_string()), &back),
    };
    let rating = match validation::validate_rating(form.rating) {
        Ok(r) => r,
        Err(e) => return flash_redirect(&state, &sid, Flash::error(e.to_string()), &back),
    };

    match state
        .db
        .comments()
        .insert(&listing.id, &user.id, &content, rating)
        .await
    {
        Ok(comment) => {
            info!(comment_id = %comment.id, listing_id = %listing.id, rating, "Comment posted");
            flash_redirect(&state, &sid, Flash::success("Comment posted"), &back)
        }
        Err(e) => WebError::from(e).into_response(),
    }
}
