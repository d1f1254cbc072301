//! Site header: navigation links and the account controls.

use super::{HOME_ROUTE, PROFILE_ROUTE};
use crate::state::session::{Gate, Session, SessionStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub to: &'static str,
    pub label: &'static str,
}

const HOME: NavLink = NavLink { to: "/", label: "Home" };
const ABOUT: NavLink = NavLink { to: "/about", label: "About" };
const CREATE: NavLink = NavLink { to: "/create", label: "Create post" };

/// Right-hand side of the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountControls {
    /// Session still hydrating: render nothing rather than guess.
    Hidden,
    /// Login and sign-up buttons.
    SignedOut,
    SignedIn { profile_route: &'static str, profile_label: String, initials: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderView {
    pub links: Vec<NavLink>,
    pub account: AccountControls,
}

impl HeaderView {
    #[must_use]
    pub fn from_session(session: &Session) -> Self {
        match session.gate() {
            Gate::Pending => Self { links: vec![HOME, ABOUT], account: AccountControls::Hidden },
            Gate::Anonymous => Self { links: vec![HOME, ABOUT], account: AccountControls::SignedOut },
            Gate::Authenticated(user) => Self {
                links: vec![HOME, ABOUT, CREATE],
                account: AccountControls::SignedIn {
                    profile_route: PROFILE_ROUTE,
                    profile_label: format!("Profile ({})", user.handle()),
                    initials: user.initials(),
                },
            },
        }
    }
}

/// Log out and return the route to navigate to.
pub async fn logout(session: &SessionStore) -> &'static str {
    session.logout().await;
    HOME_ROUTE
}

#[cfg(test)]
#[path = "header_test.rs"]
mod tests;
