//! Session store: who is logged in, and with which bearer token.
//!
//! ARCHITECTURE
//! ============
//! One `SessionStore` is built per process and cloned into every consumer
//! (API client, pages). Clones share the same `Arc<RwLock<Session>>`, so a
//! login or logout is visible to all of them once the call returns.
//!
//! ORDERING
//! ========
//! Mutations write persisted storage first and then the in-memory state while
//! holding the write lock. A read issued after a mutation resolves therefore
//! observes the new value in both places.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::Method;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::storage::{Clock, SessionStorage, StorageError, StoredEntry, SystemClock};
use crate::net::error::ApiError;
use crate::net::http::Transport;
use crate::net::types::{LoginRequest, LoginResponse, Registration, User};

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-serialized user record.
pub const USER_KEY: &str = "user";
/// Lifetime of persisted session entries.
pub const SESSION_TTL: time::Duration = time::Duration::days(3);

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const REGISTER_FAILED: &str = "Registration failed. Please try again.";
pub const LOGOUT_FAILED: &str = "Logout failed.";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Message suitable for a notification.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Persisted state has not been read yet.
    Loading,
    Ready,
}

/// The identity and credential of a logged-in user. Always held together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub user: User,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

/// Snapshot of the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    status: SessionStatus,
    credentials: Option<Credentials>,
}

/// What a view may render for the current session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate<'a> {
    /// Session not hydrated yet; render a neutral loading state.
    Pending,
    Anonymous,
    Authenticated(&'a User),
}

impl Session {
    #[must_use]
    pub fn loading() -> Self {
        Self { status: SessionStatus::Loading, credentials: None }
    }

    #[must_use]
    pub fn ready(credentials: Option<Credentials>) -> Self {
        Self { status: SessionStatus::Ready, credentials }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.credentials.as_ref().map(|c| &c.user)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.token.as_str())
    }

    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    #[must_use]
    pub fn gate(&self) -> Gate<'_> {
        match (self.status, &self.credentials) {
            (SessionStatus::Loading, _) => Gate::Pending,
            (SessionStatus::Ready, None) => Gate::Anonymous,
            (SessionStatus::Ready, Some(c)) => Gate::Authenticated(&c.user),
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<Session>>,
    hydrated: Arc<AtomicBool>,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    transport: Transport,
}

impl SessionStore {
    #[must_use]
    pub fn new(transport: Transport, storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_clock(transport, storage, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(transport: Transport, storage: Arc<dyn SessionStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(Session::loading())),
            hydrated: Arc::new(AtomicBool::new(false)),
            storage,
            clock,
            transport,
        }
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Rebuild the session from persisted storage.
    ///
    /// Only the first call reads storage; later calls return the current
    /// snapshot. Unreadable or expired entries resolve to an anonymous session.
    pub async fn hydrate(&self) -> Session {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            tracing::debug!("session already hydrated");
            return self.snapshot().await;
        }

        let credentials = match self.read_persisted(self.clock.now()) {
            Ok(credentials) => credentials,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; starting anonymous");
                None
            }
        };

        let mut state = self.state.write().await;
        *state = Session::ready(credentials);
        tracing::info!(user_id = state.user().map(|u| u.id), "session hydrated");
        state.clone()
    }

    /// Authenticate against `POST /api/login` and persist the result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Api`] when the backend refuses or is unreachable and
    /// [`SessionError::Storage`] when the session cannot be persisted. Prior
    /// in-memory state is left untouched in both cases.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let request = self
            .transport
            .request(Method::POST, "/api/login", None)
            .json(&LoginRequest { email, password });
        let LoginResponse { token, user } = self.transport.send_json(request, LOGIN_FAILED).await?;

        let expires_at = self.clock.now() + SESSION_TTL;
        let credentials = Credentials { user, token, expires_at };

        let mut state = self.state.write().await;
        self.persist(&credentials)?;
        *state = Session::ready(Some(credentials.clone()));
        self.hydrated.store(true, Ordering::SeqCst);

        tracing::info!(user_id = credentials.user.id, "logged in");
        Ok(credentials.user)
    }

    /// Create an account via `POST /api/register`. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] when the backend rejects the profile or is unreachable.
    pub async fn register(&self, profile: &Registration) -> Result<(), ApiError> {
        let request = self.transport.request(Method::POST, "/api/register", None).json(profile);
        self.transport.send(request, REGISTER_FAILED).await?;
        tracing::info!(email = %profile.email, "registered");
        Ok(())
    }

    /// Tell the backend to revoke the token, then clear the session no matter
    /// how that went.
    pub async fn logout(&self) {
        let token = self.state.read().await.token().map(ToOwned::to_owned);
        if let Some(token) = token {
            let request = self.transport.request(Method::POST, "/api/logout", Some(&token));
            if let Err(e) = self.transport.send(request, LOGOUT_FAILED).await {
                tracing::warn!(code = e.error_code(), error = ?e, "logout notification failed");
            }
        }
        self.clear("logout").await;
    }

    /// Drop the session locally, e.g. after the backend rejected the token.
    pub async fn invalidate(&self) {
        self.clear("invalidated").await;
    }

    pub async fn snapshot(&self) -> Session {
        self.live().await
    }

    pub async fn status(&self) -> SessionStatus {
        self.live().await.status()
    }

    pub async fn user(&self) -> Option<User> {
        self.live().await.user().cloned()
    }

    /// Bearer token for an outgoing request.
    pub async fn bearer(&self) -> Option<String> {
        self.live().await.token().map(ToOwned::to_owned)
    }

    /// Current session. Credentials whose persisted lifetime has elapsed are
    /// cleared before anything reads them.
    async fn live(&self) -> Session {
        let session = self.state.read().await.clone();
        let expired = session
            .credentials()
            .filter(|c| self.clock.now() >= c.expires_at)
            .map(|c| c.user.id);
        let Some(user_id) = expired else {
            return session;
        };
        tracing::info!(user_id, "session expired");
        self.clear("expired").await;
        self.state.read().await.clone()
    }

    fn read_persisted(&self, now: OffsetDateTime) -> Result<Option<Credentials>, StorageError> {
        let token_entry = self.storage.load(TOKEN_KEY)?.filter(|e| e.is_live(now));
        let user_entry = self.storage.load(USER_KEY)?.filter(|e| e.is_live(now));
        let (Some(token_entry), Some(user_entry)) = (token_entry, user_entry) else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&user_entry.value) {
            Ok(user) => Ok(Some(Credentials { user, token: token_entry.value, expires_at: token_entry.expires_at })),
            Err(e) => {
                tracing::warn!(error = %e, "persisted user record is invalid");
                Ok(None)
            }
        }
    }

    fn persist(&self, credentials: &Credentials) -> Result<(), StorageError> {
        let user = serde_json::to_string(&credentials.user)?;
        let expires_at = credentials.expires_at;
        let previous_token = self.storage.load(TOKEN_KEY)?;
        self.storage.store(TOKEN_KEY, StoredEntry { value: credentials.token.clone(), expires_at })?;
        if let Err(e) = self.storage.store(USER_KEY, StoredEntry { value: user, expires_at }) {
            // Never leave the new token paired with an older user record.
            let rollback = match previous_token {
                Some(entry) => self.storage.store(TOKEN_KEY, entry),
                None => self.storage.remove(TOKEN_KEY),
            };
            if let Err(rollback) = rollback {
                tracing::warn!(error = %rollback, "failed to roll back persisted token");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn clear(&self, reason: &'static str) {
        let mut state = self.state.write().await;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear persisted session entry");
            }
        }
        let user_id = state.user().map(|u| u.id);
        *state = Session::ready(None);
        self.hydrated.store(true, Ordering::SeqCst);
        tracing::info!(reason, user_id, "session cleared");
    }
}
