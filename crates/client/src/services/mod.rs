//! Application services.
//!
//! Each service owns a cheap clone of the [`ApiClient`] and the
//! [`LocalState`] and implements one page's worth of behaviour. None of
//! them print or prompt; they return values and errors for the front end.

pub mod admin;
pub mod checkout;
pub mod menu;
pub mod session;

pub use admin::{AdminError, AdminService, AdminSnapshot};
pub use checkout::{CheckoutError, CheckoutService, SubmitControl, SubmitGuard};
pub use menu::{MenuError, MenuService};
pub use session::{LoginOutcome, RegistrationForm, SessionError, SessionService};

use secrecy::SecretString;

use crate::api::ApiClient;
use crate::storage::{LocalState, StorageError};

/// The API client carrying the stored token, if there is one.
fn authorized(api: &ApiClient, state: &LocalState) -> Result<Option<ApiClient>, StorageError> {
    Ok(state.token()?.map(|token: SecretString| api.with_token(token)))
}
