//! Task-scoped cart provider.
//!
//! Passing a [`CartStore`] handle explicitly is the normal way to share a
//! cart. This module covers code paths that cannot take one as a parameter:
//! [`provide`] makes a store current for the duration of a future, and
//! [`use_cart`] retrieves it from anywhere inside that future.

use std::future::Future;

use crate::error::CartError;
use crate::store::CartStore;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Run `scope` with `store` as the current cart.
pub async fn provide<F>(store: CartStore, scope: F) -> F::Output
where
    F: Future,
{
    CURRENT_CART.scope(store, scope).await
}

/// The current cart.
///
/// # Errors
///
/// Returns `CartError::OutsideProvider` when called outside [`provide`].
pub fn try_use_cart() -> Result<CartStore, CartError> {
    CURRENT_CART
        .try_with(CartStore::clone)
        .map_err(|_| CartError::OutsideProvider)
}

/// The current cart.
///
/// # Panics
///
/// Panics when called outside [`provide`]. Reaching for the cart without a
/// provider is a wiring bug, not a runtime condition.
#[must_use]
pub fn use_cart() -> CartStore {
    match try_use_cart() {
        Ok(store) => store,
        Err(e) => panic!("{e}"),
    }
}
