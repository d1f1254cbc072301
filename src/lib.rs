//! Client core for the folio blogging backend.
//!
//! ARCHITECTURE
//! ============
//! `state` owns the session lifecycle (hydration, login, logout) and the
//! cookie-like persisted storage behind it. `net` is the HTTP glue: a shared
//! transport plus the typed resource client that attaches the session token.
//! `pages` holds headless view state for each screen, so any rendering layer
//! (or the bundled CLI) can drive them.

pub mod config;
pub mod net;
pub mod pages;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use net::api::ApiClient;
pub use net::error::ApiError;
pub use state::session::{Session, SessionError, SessionStatus, SessionStore};
