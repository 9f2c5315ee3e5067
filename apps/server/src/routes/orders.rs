//! # Order Routes
//!
//! Order confirmation and the three role dashboards.
//!
//! ## The Confirm Gate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   POST /orders/:id/confirm                                              │
//! │                                                                         │
//! │   logged in? ──no──► flash + redirect to login                          │
//! │   seller role? ──no──► flash + redirect to /listings                    │
//! │   order exists? ──no──► 404                                             │
//! │   order is on MY listing? ──no──► flash + redirect                      │
//! │   status == pending? ──no──► flash "already handled"                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │   status := confirmed (validated by souk_core::Order::confirm)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde_json::json;
use tracing::info;

use souk_core::{access, OrderStatus, Profile, Role, User};

use crate::error::{WebError, WebResult};
use crate::routes::{flash_redirect, profile_or_gap, require_login};
use crate::session::{Flash, SessionId};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders/:id/confirm", post(confirm_order))
        .route("/dashboard/buyer", get(buyer_dashboard))
        .route("/dashboard/seller", get(seller_dashboard))
        .route("/dashboard/admin", get(admin_dashboard))
}

// =============================================================================
// Confirm
// =============================================================================

/// POST /orders/:id/confirm
async fn confirm_order(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Path(id): Path<String>,
) -> Response {
    let (user, profile) = match require_login(&state, &sid).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };
    let profile = match profile_or_gap(&user, profile) {
        Ok(p) => p,
        Err(e) => return e.into_response(),
    };
    if let Err(e) = access::require_role(&user.id, Some(&profile), Role::Seller) {
        return flash_redirect(&state, &sid, Flash::error(e.to_string()), "/listings");
    }

    let mut order = match state.db.orders().get_by_id(&id).await {
        Ok(Some(order)) => order,
        Ok(None) => return WebError::NotFound(format!("order {id}")).into_response(),
        Err(e) => return WebError::from(e).into_response(),
    };

    // The order must sit on one of this seller's listings
    let listing = match state.db.listings().get_by_id(&order.listing_id).await {
        Ok(Some(listing)) => listing,
        Ok(None) => {
            return WebError::Internal(format!("order {id} references a missing listing"))
                .into_response()
        }
        Err(e) => return WebError::from(e).into_response(),
    };
    if access::require_owner(&user.id, &listing.seller_id, &listing.id).is_err() {
        return flash_redirect(
            &state,
            &sid,
            Flash::error("You can only confirm orders on your own listings"),
            "/dashboard/seller",
        );
    }

    if let Err(e) = order.confirm() {
        return flash_redirect(
            &state,
            &sid,
            Flash::error(e.to_string()),
            "/dashboard/seller",
        );
    }
    if let Err(e) = state.db.orders().update_status(&order.id, order.status).await {
        return WebError::from(e).into_response();
    }

    info!(order_id = %order.id, seller = %user.id, "Order confirmed");
    flash_redirect(
        &state,
        &sid,
        Flash::success("Order confirmed"),
        "/dashboard/seller",
    )
}

// =============================================================================
// Dashboards
// =============================================================================

/// Role gate shared by the dashboards: wrong role reads as a flash and a
/// trip back to the catalog, not a bare 403.
async fn dashboard_gate(
    state: &AppState,
    sid: &SessionId,
    required: Role,
) -> Result<(User, Profile), Response> {
    let (user, profile) = require_login(state, sid).await?;
    let profile = profile_or_gap(&user, profile).map_err(IntoResponse::into_response)?;

    if access::require_role(&user.id, Some(&profile), required).is_err() {
        return Err(flash_redirect(
            state,
            sid,
            Flash::error("That page is not available for your account"),
            "/listings",
        ));
    }

    Ok((user, profile))
}

/// GET /dashboard/buyer
async fn buyer_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Response {
    let (user, _) = match dashboard_gate(&state, &sid, Role::Buyer).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    match buyer_dashboard_body(&state, &sid, &user).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn buyer_dashboard_body(
    state: &AppState,
    sid: &SessionId,
    user: &User,
) -> WebResult<serde_json::Value> {
    let orders = state.db.orders().list_by_buyer(&user.id).await?;
    let pending = state
        .db
        .orders()
        .count_by_status_for_buyer(&user.id, OrderStatus::Pending)
        .await?;
    let confirmed = state
        .db
        .orders()
        .count_by_status_for_buyer(&user.id, OrderStatus::Confirmed)
        .await?;
    let flashes = state.sessions.take_flashes(&sid.0);

    Ok(json!({
        "orders": orders,
        "pending_count": pending,
        "confirmed_count": confirmed,
        "flashes": flashes,
    }))
}

/// GET /dashboard/seller
async fn seller_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Response {
    let (user, _) = match dashboard_gate(&state, &sid, Role::Seller).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    match seller_dashboard_body(&state, &sid, &user).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn seller_dashboard_body(
    state: &AppState,
    sid: &SessionId,
    user: &User,
) -> WebResult<serde_json::Value> {
    let listings = state.db.listings().list_by_seller(&user.id).await?;
    let orders = state.db.orders().list_for_seller(&user.id).await?;
    let flashes = state.sessions.take_flashes(&sid.0);

    Ok(json!({
        "listings": listings,
        "orders": orders,
        "flashes": flashes,
    }))
}

/// GET /dashboard/admin
async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Response {
    if let Err(response) = dashboard_gate(&state, &sid, Role::Admin).await {
        return response;
    }

    match admin_dashboard_body(&state, &sid).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn admin_dashboard_body(state: &AppState, sid: &SessionId) -> WebResult<serde_json::Value> {
    let orders = state.db.orders().list_all().await?;
    let recent_traffic = state.db.traffic().list_recent(30).await?;
    let (total_visitors, total_page_views) = state.db.traffic().totals().await?;
    let flashes = state.sessions.take_flashes(&sid.0);

    Ok(json!({
        "orders": orders,
        "traffic": {
            "recent": recent_traffic,
            "total_visitors": total_visitors,
            "total_page_views": total_page_views,
        },
        "flashes": flashes,
    }))
}
