//! Local key/value store.
//!
//! State is kept under string keys with string values, JSON where
//! structured. [`KeyValueStore`] is that contract and [`LocalState`]
//! layers typed accessors for each key on top.

mod file;
mod memory;

use std::sync::Arc;

use comanda_core::cart::Cart;
use comanda_core::confirmation::OrderConfirmation;
use comanda_core::types::{Theme, User};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys used in the local store.
pub mod keys {
    /// Bearer token of the logged-in user.
    pub const TOKEN: &str = "token";

    /// Normalized profile of the logged-in user (JSON).
    pub const USER: &str = "user";

    /// Cart lines (JSON array).
    pub const CART: &str = "carrito";

    /// Snapshot of the last submitted order (JSON).
    pub const LAST_ORDER: &str = "ultimo_pedido";

    /// Colour theme, `claro` or `oscuro`.
    pub const THEME: &str = "tema";

    /// Whether the login form remembers the email, `"true"` or `"false"`.
    pub const REMEMBER_ME: &str = "recordar-sesion";

    /// Email remembered by the login form.
    pub const SAVED_EMAIL: &str = "email-guardado";
}

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file or a stored value is not valid JSON.
    #[error("storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key/value storage with local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// =============================================================================
// LocalState
// =============================================================================

/// Typed view of the local store.
///
/// Corrupt JSON under a key reads as absent and is logged.
#[derive(Clone)]
pub struct LocalState {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for LocalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalState").finish_non_exhaustive()
    }
}

impl LocalState {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// In-memory state, for tests and one-off commands.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::default())
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable stored value");
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.store.set(key, &serde_json::to_string(value)?)
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self
            .store
            .get(keys::TOKEN)?
            .filter(|t| !t.is_empty())
            .map(SecretString::from))
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_token(&self, token: &SecretString) -> Result<(), StorageError> {
        self.store.set(keys::TOKEN, token.expose_secret())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn user(&self) -> Result<Option<User>, StorageError> {
        self.read_json(keys::USER)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_user(&self, user: &User) -> Result<(), StorageError> {
        self.write_json(keys::USER, user)
    }

    /// Forget the token and the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.store.remove(keys::TOKEN)?;
        self.store.remove(keys::USER)
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// The stored cart; empty when nothing (or nothing readable) is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn cart(&self) -> Result<Cart, StorageError> {
        Ok(self.read_json(keys::CART)?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        self.write_json(keys::CART, cart)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_cart(&self) -> Result<(), StorageError> {
        self.store.remove(keys::CART)
    }

    // -------------------------------------------------------------------------
    // Last order
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn last_order(&self) -> Result<Option<OrderConfirmation>, StorageError> {
        self.read_json(keys::LAST_ORDER)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save_last_order(&self, order: &OrderConfirmation) -> Result<(), StorageError> {
        self.write_json(keys::LAST_ORDER, order)
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear_last_order(&self) -> Result<(), StorageError> {
        self.store.remove(keys::LAST_ORDER)
    }

    // -------------------------------------------------------------------------
    // Preferences
    // -------------------------------------------------------------------------

    /// Stored theme, light when unset or unrecognized.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn theme(&self) -> Result<Theme, StorageError> {
        Ok(self
            .store
            .get(keys::THEME)?
            .and_then(|t| t.parse().ok())
            .unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.store.set(keys::THEME, theme.as_str())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn remember_me(&self) -> Result<bool, StorageError> {
        Ok(self.store.get(keys::REMEMBER_ME)?.as_deref() == Some("true"))
    }

    /// Set the remember-me flag. Turning it off forgets the saved email.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_remember_me(&self, remember: bool) -> Result<(), StorageError> {
        self.store
            .set(keys::REMEMBER_ME, if remember { "true" } else { "false" })?;
        if !remember {
            self.store.remove(keys::SAVED_EMAIL)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn saved_email(&self) -> Result<Option<String>, StorageError> {
        Ok(self.store.get(keys::SAVED_EMAIL)?.filter(|e| !e.is_empty()))
    }

    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_saved_email(&self, email: &str) -> Result<(), StorageError> {
        self.store.set(keys::SAVED_EMAIL, email)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip_and_clear() {
        let state = LocalState::in_memory();
        assert!(state.token().unwrap().is_none());
        state.set_token(&SecretString::from("abc")).unwrap();
        assert_eq!(state.token().unwrap().unwrap().expose_secret(), "abc");
        state.clear_session().unwrap();
        assert!(state.token().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_cart_reads_empty() {
        let store = MemoryStore::default();
        store.set(keys::CART, "not json").unwrap();
        let state = LocalState::new(store);
        assert!(state.cart().unwrap().is_empty());
    }

    #[test]
    fn test_remember_me_off_forgets_email() {
        let state = LocalState::in_memory();
        state.set_remember_me(true).unwrap();
        state.set_saved_email("ana@example.com").unwrap();
        assert!(state.remember_me().unwrap());
        assert_eq!(state.saved_email().unwrap().as_deref(), Some("ana@example.com"));

        state.set_remember_me(false).unwrap();
        assert!(!state.remember_me().unwrap());
        assert!(state.saved_email().unwrap().is_none());
    }

    #[test]
    fn test_theme_default_and_toggle() {
        let state = LocalState::in_memory();
        assert_eq!(state.theme().unwrap(), Theme::Light);
        state.set_theme(Theme::Dark).unwrap();
        assert_eq!(state.theme().unwrap(), Theme::Dark);
    }
}
