//! # Cart Routes
//!
//! The session cart and the checkout that turns it into an order.
//!
//! ## Checkout Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   POST /cart/checkout                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   listing still active? ── gone ──► flash + 303 back to /cart           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   validate contact fields ── invalid ──► flash + 303 back to /cart      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   build order from CART SNAPSHOT (souk_core::cart::checkout)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   INSERT order ── db error ──► 500, cart kept                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   clear cart (only after the order is durable)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   spawn notification emails (fire-and-forget)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   flash success + 303 to /dashboard/buyer                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use souk_core::{cart, ContactDetails};

use crate::error::WebError;
use crate::notify::send_order_emails;
use crate::routes::{flash_redirect, require_login};
use crate::session::{Flash, SessionId};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cart", get(view_cart))
        .route("/cart/add/:listing_id", post(add_to_cart))
        .route("/cart/clear", post(clear_cart))
        .route("/cart/checkout", post(checkout))
}

/// GET /cart
async fn view_cart(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Json<serde_json::Value> {
    let entry = state.sessions.with_cart(&sid.0, |c| c.entry().cloned());
    let flashes = state.sessions.take_flashes(&sid.0);

    Json(json!({
        "entry": entry,
        "flashes": flashes,
    }))
}

/// POST /cart/add/:listing_id
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(listing_id): Path<String>,
) -> Response {
    let (user, profile) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let listing = match state.db.listings().get_active(&listing_id).await {
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

    let first_image = match state.db.listings().first_image(&listing_id).await {
        Ok(image) => image,
        Err(e) => return WebError::from(e).into_response(),
    };

    // All guards live in the core; the cart is only touched on success
    let outcome = state.sessions.with_cart_mut(&sid.0, |cart_slot| {
        cart::add_to_cart(
            cart_slot,
            &user.id,
            profile.as_ref(),
            &listing,
            first_image.as_ref(),
        )
    });

    match outcome {
        Ok(()) => {
            info!(listing_id = %listing.id, buyer = %user.id, "Listing added to cart");
            flash_redirect(&state, &sid, Flash::success("Added to cart"), "/cart")
        }
        Err(e) => flash_redirect(
            &state,
            &sid,
            Flash::error(e.to_string()),
            &format!("/listings/{listing_id}"),
        ),
    }
}

/// POST /cart/clear
///
/// Clearing an already-empty cart is fine; the flash reads the same.
async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Response {
    state.sessions.with_cart_mut(&sid.0, |cart_slot| cart_slot.clear());
    flash_redirect(&state, &sid, Flash::info("Cart cleared"), "/cart")
}

#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub neighborhood: String,
    pub city: String,
}

/// POST /cart/checkout
async fn checkout(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let (user, profile) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let contact = ContactDetails {
        first_name: form.first_name,
        last_name: form.last_name,
        phone: form.phone,
        neighborhood: form.neighborhood,
        city: form.city,
    };

    let cart_snapshot = state.sessions.with_cart(&sid.0, |c| c.clone());

    // The listing must still be purchasable at checkout time. The price,
    // however, stays the snapshot's.
    if let Some(entry) = cart_snapshot.entry() {
        match state.db.listings().get_active(&entry.listing_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return flash_redirect(
                    &state,
                    &sid,
                    Flash::error("That listing is no longer available"),
                    "/cart",
                )
            }
            Err(e) => return WebError::from(e).into_response(),
        }
    }

    let order = match cart::checkout(&cart_snapshot, &user.id, profile.as_ref(), contact) {
        Ok(order) => order,
        Err(e) => return flash_redirect(&state, &sid, Flash::error(e.to_string()), "/cart"),
    };

    if let Err(e) = state.db.orders().insert(&order).await {
        // Cart stays intact; the buyer can retry
        return WebError::from(e).into_response();
    }

    // Only a durably stored order empties the cart
    state.sessions.with_cart_mut(&sid.0, |c| c.clear());

    info!(
        order_id = %order.id,
        buyer = %user.id,
        amount_cents = order.amount_cents,
        "Order placed"
    );

    dispatch_notifications(state.clone(), order.clone(), user.email.clone());

    flash_redirect(
        &state,
        &sid,
        Flash::success("Order placed"),
        "/dashboard/buyer",
    )
}

/// Spawns the notification emails for a placed order.
///
/// Runs after the response is decided; any failure here is log-only.
fn dispatch_notifications(state: Arc<AppState>, order: souk_core::Order, buyer_email: String) {
    tokio::spawn(async move {
        let listing = match state.db.listings().get_by_id(&order.listing_id).await {
            Ok(Some(listing)) => listing,
            Ok(None) => {
                warn!(order_id = %order.id, "Listing vanished before notification");
                return;
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Could not load listing for notification");
                return;
            }
        };

        let seller_email = match state.db.users().get_by_id(&listing.seller_id).await {
            Ok(Some(seller)) => seller.email,
            Ok(None) => {
                warn!(order_id = %order.id, "Seller account missing for notification");
                return;
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Could not load seller for notification");
                return;
            }
        };

        send_order_emails(
            state.mailer.as_ref(),
            &order,
            &buyer_email,
            &seller_email,
            &listing.title,
        );
    });
}
