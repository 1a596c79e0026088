//! Comanda Core - Domain types and ordering logic.
//!
//! This crate holds everything the restaurant ordering client can decide
//! without talking to anything. It is used by:
//! - `comanda-client` - REST client, local store and services
//! - `comanda-cli` - The `comanda` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O and no
//! HTTP. Views such as [`catalog::MenuView`] are plain data; the front end
//! decides how to draw them.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, emails, users and wire enumerations
//! - [`validation`] - Field format rules for checkout, login and registration
//! - [`cart`] - The persisted shopping cart
//! - [`checkout`] - Checkout form, step wizard and order payload
//! - [`catalog`] - Categories, products, menu and admin views
//! - [`confirmation`] - Last-order snapshot and receipt
//! - [`notice`] - Timed user notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod confirmation;
pub mod notice;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartError, CartItem};
pub use catalog::{Category, CategoryFilter, CategoryRef, Product};
pub use checkout::{CheckoutForm, OrderPayload, Wizard};
pub use confirmation::OrderConfirmation;
pub use notice::{Notice, NoticeLevel};
pub use types::*;
