//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! gm-cart show
//!
//! # Add one unit of a product
//! gm-cart add --id p1 --title "Tee" --image-url https://img/p1.png --price 19.99
//!
//! # Adjust quantities
//! gm-cart increment p1
//! gm-cart decrement p1
//! ```
//!
//! Every command opens the file-backed cart, waits for it to load, applies
//! its change, flushes, and prints the resulting cart.

use std::fmt::Write as _;

use go_marketplace_cart::{Cart, CartError, CartStore, FileStore, NewLineItem};
use go_marketplace_core::ProductId;
use thiserror::Error;

use crate::config::CliConfig;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Cart store failed to load or flush.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

/// A change to apply to the cart.
#[derive(Debug, Clone)]
pub enum Change {
    Add(NewLineItem),
    Increment(ProductId),
    Decrement(ProductId),
}

/// Open the cart, apply an optional change, persist it, and return the
/// resulting cart.
///
/// # Errors
///
/// Returns an error if the persisted cart is rejected or the writer stops.
pub async fn apply(config: &CliConfig, change: Option<Change>) -> Result<Cart, CommandError> {
    let storage = FileStore::new(&config.data_dir);
    let path = storage.path_for(&config.options.storage_key);
    tracing::debug!(path = %path.display(), "Opening cart");

    let store = CartStore::open(storage, config.options.clone()).await?;

    if let Some(Change::Increment(id) | Change::Decrement(id)) = &change
        && store.find(id).is_none()
    {
        tracing::warn!(id = %id, "No such product in cart");
    }

    match change {
        Some(Change::Add(item)) => store.add_to_cart(item),
        Some(Change::Increment(id)) => store.increment(&id),
        Some(Change::Decrement(id)) => store.decrement(&id),
        None => {}
    }

    store.flush().await?;
    Ok(store.cart())
}

/// Format a cart as a table with line totals and a subtotal.
#[must_use]
pub fn render(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    // Writing to a String cannot fail.
    let mut out = String::new();
    for item in cart.items() {
        let _ = writeln!(
            out,
            "{:<12} {:<24} {:>4} x {:>10} = {:>10}",
            item.id.as_str(),
            item.title,
            item.quantity,
            item.price.to_string(),
            item.line_total().to_string(),
        );
    }

    let summary = cart.summary();
    let _ = writeln!(
        out,
        "{} items in {} lines, subtotal {}",
        summary.item_count, summary.line_count, summary.subtotal
    );
    out
}

/// Print a cart to stdout.
#[allow(clippy::print_stdout)]
pub fn print(cart: &Cart) {
    print!("{}", render(cart));
}
