//! # Account Routes
//!
//! Registration, login, logout.
//!
//! ## Login Landing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   role    │ after login goes to                                         │
//! │  ─────────┼───────────────────────                                      │
//! │   buyer   │ /listings                                                   │
//! │   seller  │ /dashboard/seller                                           │
//! │   admin   │ /dashboard/admin                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Registration only offers buyer and seller; admin accounts are
//! provisioned out of band.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use souk_core::Role;

use crate::error::WebError;
use crate::routes::flash_redirect;
use crate::session::{Flash, SessionId};
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/register", post(register))
        .route("/accounts/login", get(login_page).post(login))
        .route("/accounts/logout", post(logout))
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hashes a password for storage.
fn hash_password(password: &str) -> Result<String, WebError> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| WebError::Internal(format!("Failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Verifies a password against its stored hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// "buyer" or "seller"
    pub role: String,
    pub phone: Option<String>,
}

/// POST /accounts/register
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let username = form.username.trim();
    let email = form.email.trim();

    if username.is_empty() || !email.contains('@') {
        return flash_redirect(
            &state,
            &sid,
            Flash::error("Username and a valid email are required"),
            "/accounts/register",
        );
    }
    if form.password.chars().count() < 8 {
        return flash_redirect(
            &state,
            &sid,
            Flash::error("Password must be at least 8 characters"),
            "/accounts/register",
        );
    }

    // Self-service registration never creates admins
    let role = match form.role.as_str() {
        "buyer" => Role::Buyer,
        "seller" => Role::Seller,
        _ => {
            return flash_redirect(
                &state,
                &sid,
                Flash::error("Choose a buyer or seller account"),
                "/accounts/register",
            )
        }
    };

    let phone = match form.phone.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(p) => match souk_core::validation::validate_phone(p) {
            Ok(clean) => Some(clean),
            Err(e) => {
                return flash_redirect(&state, &sid, Flash::error(e.to_string()), "/accounts/register")
            }
        },
    };

    let password_hash = match hash_password(&form.password) {
        Ok(h) => h,
        Err(e) => return e.into_response(),
    };

    let created = state
        .db
        .users()
        .create_with_profile(username, email, &password_hash, role, phone.as_deref())
        .await;

    match created {
        Ok(user) => {
            info!(username = %user.username, role = %role, "Account registered");
            state.sessions.login(&sid.0, &user.id);
            state
                .sessions
                .push_flash(&sid.0, Flash::success("Welcome to Souk Market"));
            landing_redirect(role).into_response()
        }
        Err(e) if e.is_unique_violation() => flash_redirect(
            &state,
            &sid,
            Flash::error("That username is already taken"),
            "/accounts/register",
        ),
        Err(e) => WebError::from(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /accounts/login
///
/// Rendering is a client concern; this returns the queued flashes so the
/// page after a redirect can show them.
async fn login_page(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Json<serde_json::Value> {
    let flashes = state.sessions.take_flashes(&sid.0);
    Json(json!({ "flashes": flashes }))
}

/// POST /accounts/login
async fn login(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
    Form(form): Form<LoginForm>,
) -> Response {
    let user = match state.db.users().get_by_username(form.username.trim()).await {
        Ok(user) => user,
        Err(e) => return WebError::from(e).into_response(),
    };

    // Same flash for unknown user and wrong password
    let Some(user) = user else {
        return flash_redirect(
            &state,
            &sid,
            Flash::error("Invalid username or password"),
            "/accounts/login",
        );
    };
    if !verify_password(&form.password, &user.password_hash) {
        return flash_redirect(
            &state,
            &sid,
            Flash::error("Invalid username or password"),
            "/accounts/login",
        );
    }

    let profile = match state.db.users().get_profile(&user.id).await {
        Ok(p) => p,
        Err(e) => return WebError::from(e).into_response(),
    };
    let Some(profile) = profile else {
        return WebError::from(souk_core::CoreError::MissingProfile {
            user_id: user.id.clone(),
        })
        .into_response();
    };

    state.sessions.login(&sid.0, &user.id);
    info!(username = %user.username, role = %profile.role, "User logged in");

    state
        .sessions
        .push_flash(&sid.0, Flash::success("Logged in"));
    landing_redirect(profile.role).into_response()
}

/// POST /accounts/logout
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(sid): Extension<SessionId>,
) -> Response {
    state.sessions.logout(&sid.0);
    flash_redirect(&state, &sid, Flash::info("Logged out"), "/listings")
}

/// Where each role lands after authenticating.
fn landing_redirect(role: Role) -> axum::response::Redirect {
    let to = match role {
        Role::Buyer => "/listings",
        Role::Seller => "/dashboard/seller",
        Role::Admin => "/dashboard/admin",
    };
    axum::response::Redirect::to(to)
}
