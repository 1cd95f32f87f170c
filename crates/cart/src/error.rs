//! Cart error types.
//!
//! Mutations never return these: storage failures are logged and absorbed by
//! the writer task, during the load step as well as behind mutations. Errors
//! surface only from a rejected payload, `flush`, parsing, and scope lookups.

use go_marketplace_core::ProductId;
use thiserror::Error;

/// Errors produced by the cart store.
#[derive(Debug, Error)]
pub enum CartError {
    /// `use_cart`/`try_use_cart` called outside a provided scope.
    #[error("use_cart must be used within a cart provider")]
    OutsideProvider,

    /// The persisted cart could not be parsed.
    #[error("Corrupt cart payload: {0}")]
    CorruptPayload(String),

    /// Two line items share an id.
    #[error("Duplicate line item: {0}")]
    DuplicateLineItem(ProductId),

    /// The persistence task is gone.
    #[error("Cart writer has shut down")]
    WriterClosed,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
