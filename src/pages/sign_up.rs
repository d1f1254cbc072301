//! Account creation form.

use super::{FieldErrors, Notification, SubmitError};
use crate::net::types::{Registration, User};
use crate::state::session::SessionStore;

pub const ACCOUNT_CREATED: &str = "Account created.";

#[derive(Clone, Debug, Default)]
pub struct SignUpForm {
    name: String,
    email: String,
    password: String,
    confirm_password: String,
    errors: FieldErrors,
    api_error: Option<String>,
    submitting: bool,
}

impl SignUpForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
        self.errors.remove("name");
    }

    pub fn set_email(&mut self, email: &str) {
        email.clone_into(&mut self.email);
        self.errors.remove("email");
    }

    pub fn set_password(&mut self, password: &str) {
        password.clone_into(&mut self.password);
        self.errors.remove("password");
    }

    pub fn set_confirm_password(&mut self, confirm: &str) {
        confirm.clone_into(&mut self.confirm_password);
        self.errors.remove("confirm_password");
    }

    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

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
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required".to_owned());
        }
        if self.email.is_empty() {
            errors.insert("email", "Email is required".to_owned());
        } else if !is_email(&self.email) {
            errors.insert("email", "Invalid email format".to_owned());
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required".to_owned());
        }
        if self.confirm_password.is_empty() {
            errors.insert("confirm_password", "Please confirm your password".to_owned());
        } else if self.password != self.confirm_password {
            errors.insert("confirm_password", "Passwords do not match".to_owned());
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate and register. With `auto_login`, the new account is then
    /// logged in and its user returned.
    ///
    /// # Errors
    ///
    /// [`SubmitError::Invalid`] on validation failure, [`SubmitError::Failed`]
    /// when registration or the follow-up login fails.
    pub async fn submit(&mut self, session: &SessionStore, auto_login: bool) -> Result<Option<User>, SubmitError> {
        self.api_error = None;
        if !self.validate() {
            return Err(SubmitError::Invalid);
        }

        let profile = Registration {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            password_confirmation: self.confirm_password.clone(),
        };

        self.submitting = true;
        let result = self.register_then_login(session, &profile, auto_login).await;
        self.submitting = false;

        result.map_err(|message| {
            self.api_error = Some(message.clone());
            SubmitError::Failed(Notification::error(message))
        })
    }

    async fn register_then_login(
        &self,
        session: &SessionStore,
        profile: &Registration,
        auto_login: bool,
    ) -> Result<Option<User>, String> {
        session.register(profile).await.map_err(|e| e.message())?;
        if !auto_login {
            return Ok(None);
        }
        let user = session.login(&profile.email, &profile.password).await.map_err(|e| e.message())?;
        Ok(Some(user))
    }
}

/// Strict check: exactly one `@`, no whitespace, and a dot inside the domain.
pub(crate) fn is_email(input: &str) -> bool {
    if input.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = input.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.char_indices().any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
#[path = "sign_up_test.rs"]
mod tests;
