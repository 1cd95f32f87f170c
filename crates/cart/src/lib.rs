//! Go Marketplace Cart - persistent shopping-cart state container.
//!
//! A [`CartStore`] owns the in-memory list of line items for one session,
//! exposes the cart mutations (`add_to_cart`, `increment`, `decrement`) and
//! keeps a JSON copy of the cart in a [`KeyValueStore`] so it survives
//! restarts.
//!
//! # Architecture
//!
//! - [`cart`] - The pure cart model: line items and the mutation rules
//! - [`storage`] - The key-value storage collaborator and its backends
//! - [`store`] - The session handle, load-on-startup and mutation entry points
//! - [`context`] - Task-scoped provider for code that cannot take a handle
//!
//! Persistence goes through a single writer task per store, so writes land in
//! mutation order and the last persisted snapshot is always the latest cart.
//!
//! # Example
//!
//! ```rust,no_run
//! use go_marketplace_cart::{CartOptions, CartStore, MemoryStore, NewLineItem};
//! use go_marketplace_core::{Price, ProductId};
//!
//! # async fn demo() -> Result<(), go_marketplace_cart::CartError> {
//! let store = CartStore::new(MemoryStore::new(), CartOptions::default());
//! store.wait_loaded().await?;
//!
//! store.add_to_cart(NewLineItem::new("p1", "Tee", "https://img/p1.png", Price::from(10)));
//! store.increment(&ProductId::new("p1"));
//! store.flush().await?;
//!
//! assert_eq!(store.products()[0].quantity, 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod context;
pub mod error;
pub mod options;
pub mod storage;
pub mod store;

mod writer;

pub use cart::{Cart, CartSummary, LineItem, NewLineItem};
pub use context::{provide, try_use_cart, use_cart};
pub use error::{CartError, Result};
pub use options::{
    CartOptions, DEFAULT_STORAGE_KEY, DecrementPolicy, MalformedPayload, UnknownPolicy,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::CartStore;
