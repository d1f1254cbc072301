//! Headless page state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each page owns a private copy of the data it shows and exposes the
//! operations its screen performs. Rendering layers bind to these types; the
//! CLI drives them directly. Pages never panic on backend failures: they
//! turn them into [`Notification`]s and keep a renderable fallback state.

pub mod create_post;
pub mod header;
pub mod home;
pub mod login;
pub mod profile;
pub mod show_post;
pub mod sign_up;


use std::collections::BTreeMap;

use crate::net::error::ApiError;
use crate::state::session::SessionStore;

pub const HOME_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";
pub const PROFILE_ROUTE: &str = "/profile";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient, dismissable message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Why a form submission did not go through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// Field validation failed; the form's field errors say why.
    Invalid,
    /// The action needs a logged-in user; send them to [`LOGIN_ROUTE`].
    LoginRequired(Notification),
    /// The backend call failed.
    Failed(Notification),
}

/// Field name to validation message, in field order.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Turn a failed backend call into an error notification.
///
/// A rejected credential also drops the session, so every view falls back
/// to its anonymous branch.
pub async fn report(session: &SessionStore, error: &ApiError) -> Notification {
    if error.is_auth_rejection() {
        session.invalidate().await;
    }
    tracing::warn!(code = error.error_code(), message = %error, "request failed");
    Notification::error(error.message())
}
