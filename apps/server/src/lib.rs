//! # Souk Market HTTP Server
//!
//! The axum application wiring sessions, role gates, and the catalog,
//! cart, order, and engagement routes over souk-core and souk-db.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          souk-server                                    │
//! │                                                                         │
//! │  Request ──► TraceLayer ──► session middleware ──► route handler        │
//! │                                   │                     │               │
//! │                                   ▼                     ▼               │
//! │                             SessionStore          souk-core rules       │
//! │                          (cart + flashes)               │               │
//! │                                                         ▼               │
//! │                                                   souk-db queries       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The crate is a library so integration tests can build the router and
//! drive it with `tower::ServiceExt::oneshot` without opening a socket.

pub mod config;
pub mod error;
pub mod notify;
pub mod routes;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use routes::router;
pub use state::AppState;
