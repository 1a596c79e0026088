//! Authentication endpoints.

use comanda_core::types::User;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::ApiClient;
use super::types::{Empty, LoginBody, RegisterBody, Registration, TokenBody, UserBody};
use crate::error::ApiError;

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are refused or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, ApiError> {
        let body = LoginBody {
            email,
            password: password.expose_secret(),
        };
        let request = self.anonymous().request(Method::POST, "auth/login")?.json(&body);
        let TokenBody { token } = self.send(request, "POST auth/login").await?;

        token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| ApiError::rejected(Some("Login failed: no token received.".to_string())))
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the registration or the
    /// request fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let body = RegisterBody {
            registration,
            password: registration.password.expose_secret(),
        };
        let request = self
            .anonymous()
            .request(Method::POST, "auth/register")?
            .json(&body);
        let Empty {} = self.send(request, "POST auth/register").await?;
        Ok(())
    }

    /// Check that the current token is still valid.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is refused or the request fails.
    #[instrument(skip(self))]
    pub async fn verify(&self) -> Result<(), ApiError> {
        let request = self.request(Method::GET, "auth/verify")?;
        let Empty {} = self.send(request, "GET auth/verify").await?;
        Ok(())
    }

    /// Fetch the profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is refused, the request fails, or the
    /// response carries no user.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        let request = self.request(Method::GET, "auth/me")?;
        let UserBody { user } = self.send(request, "GET auth/me").await?;
        user.ok_or_else(|| ApiError::Decode {
            context: "GET auth/me",
            detail: "response has no user".to_string(),
        })
    }
}
