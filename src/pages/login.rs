//! Login form.

use super::{FieldErrors, Notification, SubmitError};
use crate::net::types::User;
use crate::state::session::SessionStore;

#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    email: String,
    password: String,
    errors: FieldErrors,
    api_error: Option<String>,
    submitting: bool,
}

impl LoginForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_email(&mut self, email: &str) {
        email.clone_into(&mut self.email);
        self.errors.remove("email");
    }

    pub fn set_password(&mut self, password: &str) {
        password.clone_into(&mut self.password);
        self.errors.remove("password");
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Message from the last failed login attempt.
    #[must_use]
    pub fn api_error(&self) -> Option<&str> {
        self.api_error.as_deref()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();
        if self.email.is_empty() {
            errors.insert("email", "Email is required".to_owned());
        } else if !contains_email(&self.email) {
            errors.insert("email", "Please enter a valid email address".to_owned());
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required".to_owned());
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and log in.
    ///
    /// A failed attempt leaves any existing session untouched; the backend's
    /// message is kept in [`LoginForm::api_error`].
    ///
    /// # Errors
    ///
    /// [`SubmitError::Invalid`] on validation failure, [`SubmitError::Failed`]
    /// when the backend refuses the credentials.
    pub async fn submit(&mut self, session: &SessionStore) -> Result<User, SubmitError> {
        self.api_error = None;
        if !self.validate() {
            return Err(SubmitError::Invalid);
        }

        self.submitting = true;
        let result = session.login(&self.email, &self.password).await;
        self.submitting = false;

        result.map_err(|e| {
            let message = e.message();
            self.api_error = Some(message.clone());
            SubmitError::Failed(Notification::error(message))
        })
    }
}

/// Loose check: somewhere in the input, a run of non-space characters
/// shaped like `a@b.c`.
pub(crate) fn contains_email(input: &str) -> bool {
    input.split_whitespace().any(|word| {
        let chars: Vec<char> = word.chars().collect();
        // The first '@' after position 0 leaves the widest domain part.
        let Some(at) = chars.iter().skip(1).position(|&c| c == '@').map(|i| i + 1) else {
            return false;
        };
        let domain_start = at + 2;
        domain_start < chars.len() && chars[domain_start..chars.len() - 1].contains(&'.')
    })
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
