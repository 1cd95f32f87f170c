//! Integration tests for the Go Marketplace cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p go-marketplace-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_restart` - Carts surviving a store being dropped and reopened
//! - `cart_provider` - Consumers reaching the cart through the task-scoped provider
//!
//! The helpers below give each test its own on-disk cart directory.

use std::path::Path;

use go_marketplace_cart::{CartOptions, CartStore, FileStore, NewLineItem, Result};
use go_marketplace_core::Price;

/// Open a file-backed store in `dir` and wait for it to load.
///
/// # Errors
///
/// Propagates load failures from [`CartStore::open`].
pub async fn open_store(dir: &Path, options: CartOptions) -> Result<CartStore> {
    CartStore::open(FileStore::new(dir), options).await
}

/// A catalog entry for tests.
#[must_use]
pub fn product(id: &str, title: &str, cents: i64) -> NewLineItem {
    NewLineItem::new(
        id,
        title,
        format!("https://cdn.example.com/{id}.png"),
        Price::from_cents(cents),
    )
}
