//! Go Marketplace Core - Shared types library.
//!
//! This crate provides the types shared by the Go Marketplace components:
//! - `cart` - Cart state container and its persistence
//! - `cli` - Command-line front end for inspecting and editing a cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product identifiers and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
