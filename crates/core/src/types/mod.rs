//! Core types for Comanda.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, MONEY_SCALE, Price, round_money};
pub use status::*;
pub use user::{Landing, User};
