//! Failure taxonomy for backend calls.
//!
//! Every variant carries the message shown to the user: the backend's
//! `message` field when the body has one, else the calling operation's
//! fallback text.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Deserialize;

/// Errors produced by backend requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("{message}")]
    Network { message: String, detail: String },

    /// The backend rejected the request (4xx other than 401).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend rejected or expired the bearer credential (401).
    #[error("{message}")]
    Unauthorized { message: String },

    /// Server failure (5xx or unexpected status).
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A success response whose body does not match the expected shape.
    #[error("{message}")]
    Malformed { message: String, detail: String },

    /// The request could not be assembled (bad URL, header or media type).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    /// Human-readable message for notifications.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Stable code for structured logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network { .. } => "E_NETWORK",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Server { .. } => "E_SERVER",
            Self::Malformed { .. } => "E_MALFORMED",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
            Self::ClientBuild(_) => "E_CLIENT_BUILD",
        }
    }

    /// Whether the session credential was rejected.
    #[must_use]
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Pull the backend's `message` field out of an error body.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.message.map(|m| m.trim().to_owned()).filter(|m| !m.is_empty())
}

/// Map a non-success status and its body onto the taxonomy.
pub(crate) fn classify(status: u16, body: &str, fallback: &str) -> ApiError {
    let message = extract_message(body).unwrap_or_else(|| fallback.to_owned());
    match status {
        401 => ApiError::Unauthorized { message },
        400..=499 => ApiError::Rejected { status, message },
        _ => ApiError::Server { status, message },
    }
}
