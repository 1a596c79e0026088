//! Login, registration and session state.

use comanda_core::checkout::CheckoutForm;
use comanda_core::types::{Email, Landing, Theme, User};
use comanda_core::validation::{self, ValidationFailure};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tracing::{info, instrument, warn};

use super::authorized;
use crate::api::{ApiClient, Registration};
use crate::error::ApiError;
use crate::storage::{LocalState, StorageError};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A login or registration field is blank.
    #[error("Please fill in every field.")]
    MissingFields,

    /// A field has the wrong format.
    #[error("{0}")]
    Invalid(#[from] ValidationFailure),

    /// The operation needs a logged-in user.
    #[error("You need to log in first.")]
    NotLoggedIn,

    /// The backend refused or failed the request.
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    /// The local store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub landing: Landing,
}

/// Registration form contents.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl RegistrationForm {
    /// Check the form and build the request body.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingFields`] or [`SessionError::Invalid`].
    pub fn validate(&self) -> Result<Registration, SessionError> {
        let first = self.first_name.trim();
        let last = self.last_name.trim();
        let email = self.email.trim();
        if first.is_empty() || last.is_empty() || email.is_empty() || self.password.is_empty() {
            return Err(SessionError::MissingFields);
        }

        let email = Email::parse(email).map_err(ValidationFailure::from)?;
        validation::password(&self.password)?;
        validation::password_confirmation(&self.password, self.password_confirmation.as_deref())?;

        let phone = non_blank(self.phone.as_deref());
        if let Some(phone) = &phone {
            validation::phone(validation::Field::Phone, phone)?;
        }

        Ok(Registration {
            full_name: format!("{first} {last}"),
            email: email.into_inner(),
            password: SecretString::from(self.password.clone()),
            phone,
            address: non_blank(self.address.as_deref()),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Session page logic.
#[derive(Debug, Clone)]
pub struct SessionService {
    api: ApiClient,
    state: LocalState,
}

impl SessionService {
    #[must_use]
    pub const fn new(api: ApiClient, state: LocalState) -> Self {
        Self { api, state }
    }

    /// Log in, store the token and profile, and apply remember-me.
    ///
    /// # Errors
    ///
    /// Returns an error for blank or malformed input, refused credentials,
    /// transport failures, or store failures. A failed profile fetch leaves
    /// no token behind.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        remember: bool,
    ) -> Result<LoginOutcome, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.expose_secret().is_empty() {
            return Err(SessionError::MissingFields);
        }
        let email = Email::parse(email).map_err(ValidationFailure::from)?;

        let token = self.api.login(email.as_str(), password).await?;
        self.state.set_token(&token)?;

        let user = match self.api.with_token(token).me().await {
            Ok(user) => user,
            Err(e) => {
                self.state.clear_session()?;
                return Err(e.into());
            }
        };
        self.state.set_user(&user)?;

        self.state.set_remember_me(remember)?;
        if remember {
            self.state.set_saved_email(email.as_str())?;
        }

        info!(role = %user.role, "Logged in");
        Ok(LoginOutcome {
            landing: user.landing(),
            user,
        })
    }

    /// Create an account. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input or if the backend refuses.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), SessionError> {
        let registration = form.validate()?;
        self.api.register(&registration).await?;
        info!("Registered new account");
        Ok(())
    }

    /// Check the stored token with the backend.
    ///
    /// Returns `false` without a token. Any failure, including transport
    /// errors, clears the session.
    ///
    /// # Errors
    ///
    /// Returns an error only if the local store fails.
    #[instrument(skip(self))]
    pub async fn verify(&self) -> Result<bool, SessionError> {
        let Some(api) = authorized(&self.api, &self.state)? else {
            return Ok(false);
        };
        match api.verify().await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, "Session verification failed, clearing session");
                self.state.clear_session()?;
                Ok(false)
            }
        }
    }

    /// The stored user, if logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn current_user(&self) -> Result<Option<User>, SessionError> {
        if self.state.token()?.is_none() {
            return Ok(None);
        }
        Ok(self.state.user()?)
    }

    /// Forget the token, the user and the cart. Theme and remember-me
    /// settings stay.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.state.clear_session()?;
        self.state.clear_cart()?;
        info!("Logged out");
        Ok(())
    }

    /// Email to prefill on the login form, when remember-me is on.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn remembered_email(&self) -> Result<Option<String>, SessionError> {
        if !self.state.remember_me()? {
            return Ok(None);
        }
        Ok(self.state.saved_email()?)
    }

    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn theme(&self) -> Result<Theme, SessionError> {
        Ok(self.state.theme()?)
    }

    /// Switch between light and dark, returning the new theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn toggle_theme(&self) -> Result<Theme, SessionError> {
        let theme = self.state.theme()?.toggled();
        self.state.set_theme(theme)?;
        Ok(theme)
    }

    /// # Errors
    ///
    /// Returns an error if the local store fails.
    pub fn set_theme(&self, theme: Theme) -> Result<(), SessionError> {
        Ok(self.state.set_theme(theme)?)
    }

    /// Fill the checkout customer block from the user's profile.
    ///
    /// Uses the stored profile, falling back to `GET /auth/me` when only a
    /// token is stored.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotLoggedIn`] without a token, or the
    /// profile fetch error.
    #[instrument(skip(self, form))]
    pub async fn prefill_checkout(&self, form: &mut CheckoutForm) -> Result<User, SessionError> {
        let Some(api) = authorized(&self.api, &self.state)? else {
            return Err(SessionError::NotLoggedIn);
        };
        let user = match self.state.user()? {
            Some(user) => user,
            None => {
                let user = api.me().await?;
                self.state.set_user(&user)?;
                user
            }
        };
        form.prefill(&user);
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm {
            first_name: "Ana".to_string(),
            last_name: " Torres ".to_string(),
            email: "ana@example.com".to_string(),
            password: "secreto".to_string(),
            password_confirmation: Some("secreto".to_string()),
            phone: Some(" ".to_string()),
            address: None,
        }
    }

    #[test]
    fn test_registration_full_name() {
        let registration = form().validate().unwrap();
        assert_eq!(registration.full_name, "Ana Torres");
        assert!(registration.phone.is_none());
    }

    #[test]
    fn test_registration_rejects_short_password() {
        let mut form = form();
        form.password = "12345".to_string();
        form.password_confirmation = None;
        assert!(matches!(
            form.validate(),
            Err(SessionError::Invalid(ValidationFailure::PasswordTooShort { min: 6 }))
        ));
    }

    #[test]
    fn test_registration_rejects_mismatch_and_bad_phone() {
        let mut mismatch = form();
        mismatch.password_confirmation = Some("otro123".to_string());
        assert!(matches!(
            mismatch.validate(),
            Err(SessionError::Invalid(ValidationFailure::PasswordMismatch))
        ));

        let mut bad_phone = form();
        bad_phone.phone = Some("12345".to_string());
        assert!(matches!(bad_phone.validate(), Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_registration_requires_fields() {
        let mut blank = form();
        blank.first_name = String::new();
        assert!(matches!(blank.validate(), Err(SessionError::MissingFields)));
    }
}
