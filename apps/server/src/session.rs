//! # Session Store
//!
//! Cookie-backed in-memory sessions: login state, the single-slot cart,
//! and pending flash messages.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Middleware Flow                           │
//! │                                                                         │
//! │  Request arrives                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cookie "sid" present AND known? ──no──► create session, mark new      │
//! │       │ yes                                      │                      │
//! │       ▼                                          │                      │
//! │  record traffic (page view; +visitor if new) ◄───┘                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  insert SessionId extension ──► handler runs                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  new session? append Set-Cookie to the response                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why In-Memory?
//! Sessions hold a cart snapshot and flashes, nothing that must survive a
//! restart. A logged-out restart is acceptable for this deployment shape.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use souk_core::Cart;

use crate::state::AppState;

// =============================================================================
// Flash Messages
// =============================================================================

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

/// A one-shot message queued for the next page the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Flash {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Per-visitor state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Logged-in user, if any.
    pub user_id: Option<String>,
    /// The single-slot cart.
    pub cart: Cart,
    /// Flashes waiting to be drained by the next render.
    pub flashes: Vec<Flash>,
}

/// The session id carried through request extensions.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

// =============================================================================
// Session Store
// =============================================================================

/// Shared in-memory session map.
///
/// Uses `Arc<Mutex<HashMap>>`: every access is a short critical section,
/// so a plain Mutex is enough.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        SessionStore {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a fresh session and returns its id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.inner.lock().expect("Session mutex poisoned");
        sessions.insert(id.clone(), Session::default());
        id
    }

    /// Whether a session with this id exists.
    pub fn exists(&self, id: &str) -> bool {
        let sessions = self.inner.lock().expect("Session mutex poisoned");
        sessions.contains_key(id)
    }

    /// The logged-in user of a session, if any.
    pub fn user_id(&self, id: &str) -> Option<String> {
        let sessions = self.inner.lock().expect("Session mutex poisoned");
        sessions.get(id).and_then(|s| s.user_id.clone())
    }

    /// Marks the session as logged in.
    pub fn login(&self, id: &str, user_id: &str) {
        let mut sessions = self.inner.lock().expect("Session mutex poisoned");
        if let Some(session) = sessions.get_mut(id) {
            session.user_id = Some(user_id.to_string());
        }
    }

    /// Logs the session out. The cart goes with the login.
    pub fn logout(&self, id: &str) {
        let mut sessions = self.inner.lock().expect("Session mutex poisoned");
        if let Some(session) = sessions.get_mut(id) {
            session.user_id = None;
            session.cart.clear();
        }
    }

    /// Executes a function with read access to the session's cart.
    ///
    /// An unknown session reads as an empty cart.
    pub fn with_cart<F, R>(&self, id: &str, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let sessions = self.inner.lock().expect("Session mutex poisoned");
        match sessions.get(id) {
            Some(session) => f(&session.cart),
            None => f(&Cart::new()),
        }
    }

    /// Executes a function with write access to the session's cart.
    ///
    /// Writes against an unknown session land on a throwaway cart.
    pub fn with_cart_mut<F, R>(&self, id: &str, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut sessions = self.inner.lock().expect("Session mutex poisoned");
        match sessions.get_mut(id) {
            Some(session) => f(&mut session.cart),
            None => f(&mut Cart::new()),
        }
    }

    /// Queues a flash for the next render.
    pub fn push_flash(&self, id: &str, flash: Flash) {
        let mut sessions = self.inner.lock().expect("Session mutex poisoned");
        if let Some(session) = sessions.get_mut(id) {
            session.flashes.push(flash);
        }
    }

    /// Drains all pending flashes. Flashes are shown exactly once.
    pub fn take_flashes(&self, id: &str) -> Vec<Flash> {
        let mut sessions = self.inner.lock().expect("Session mutex poisoned");
        sessions
            .get_mut(id)
            .map(|s| std::mem::take(&mut s.flashes))
            .unwrap_or_default()
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Resolves or creates the visitor's session and counts the page view.
///
/// New sessions get a `Set-Cookie` on the way out. Traffic recording
/// failures are logged and ignored: counters must never break a request.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config.session_cookie.clone();

    let existing = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| cookie_value(raw, &cookie_name));

    let (sid, is_new) = match existing {
        Some(id) if state.sessions.exists(&id) => (id, false),
        _ => (state.sessions.create(), true),
    };

    if let Err(e) = state
        .db
        .traffic()
        .record_visit(Utc::now().date_naive(), is_new)
        .await
    {
        warn!(error = %e, "Failed to record site traffic");
    }

    request.extensions_mut().insert(SessionId(sid.clone()));

    let mut response = next.run(request).await;

    if is_new {
        let cookie = format!("{cookie_name}={sid}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }

    response
}

/// Extracts a cookie value from a raw `Cookie` header.
fn cookie_value(raw: &str, name: &str) -> Option<String> {
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use souk_core::CartEntry;

    #[test]
    fn test_cookie_value_parsing() {
        assert_eq!(
            cookie_value("sid=abc123; theme=dark", "sid"),
            Some("abc123".to_string())
        );
        assert_eq!(
            cookie_value("theme=dark; sid=abc123", "sid"),
            Some("abc123".to_string())
        );
        assert_eq!(cookie_value("theme=dark", "sid"), None);
        assert_eq!(cookie_value("", "sid"), None);
    }

    #[test]
    fn test_login_logout_clears_cart() {
        let store = SessionStore::new();
        let sid = store.create();

        store.login(&sid, "u-1");
        store.with_cart_mut(&sid, |cart| {
            cart.add(CartEntry {
                listing_id: "l-1".to_string(),
                title: "Plot".to_string(),
                price_cents: 100,
                image_path: None,
                added_at: Utc::now(),
            });
        });
        assert_eq!(store.user_id(&sid), Some("u-1".to_string()));
        assert!(!store.with_cart(&sid, |c| c.is_empty()));

        store.logout(&sid);
        assert_eq!(store.user_id(&sid), None);
        assert!(store.with_cart(&sid, |c| c.is_empty()));
    }

    #[test]
    fn test_flashes_drain_once() {
        let store = SessionStore::new();
        let sid = store.create();

        store.push_flash(&sid, Flash::error("Nope"));
        store.push_flash(&sid, Flash::success("Done"));

        let flashes = store.take_flashes(&sid);
        assert_eq!(flashes.len(), 2);
        assert!(store.take_flashes(&sid).is_empty());
    }

    #[test]
    fn test_unknown_session_is_inert() {
        let store = SessionStore::new();
        assert!(!store.exists("ghost"));
        assert_eq!(store.user_id("ghost"), None);
        assert!(store.take_flashes("ghost").is_empty());
        assert!(store.with_cart("ghost", |c| c.is_empty()));
    }
}
