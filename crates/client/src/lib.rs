//! Comanda Client - REST client, local store and page services.
//!
//! # Architecture
//!
//! - [`api`] - Typed client for the ordering backend
//! - [`storage`] - Key/value store persisting the session, cart and last order
//! - [`services`] - One service per page (menu, checkout, session, admin)
//! - [`config`] - Environment configuration
//!
//! Services hold cheap clones of an [`ApiClient`] and a [`LocalState`], so a
//! front end builds both once and hands them out.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod storage;

pub use api::{ApiClient, CheckoutLookups, LookupSource, Registration};
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use services::{
    AdminError, AdminService, AdminSnapshot, CheckoutError, CheckoutService, LoginOutcome,
    MenuError, MenuService, RegistrationForm, SessionError, SessionService, SubmitControl,
    SubmitGuard,
};
pub use storage::{FileStore, KeyValueStore, LocalState, MemoryStore, StorageError};
