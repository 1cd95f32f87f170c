//! The session cart handle.

use std::fmt;
use std::sync::Arc;

use go_marketplace_core::ProductId;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, instrument, warn};

use crate::cart::{Cart, CartSummary, LineItem, NewLineItem};
use crate::error::{CartError, Result};
use crate::options::CartOptions;
use crate::storage::KeyValueStore;
use crate::writer::{self, Command, LoadState, Shared};

/// Cart state for one session.
///
/// This struct is cheaply cloneable via `Arc`; every clone reads and mutates
/// the same cart. Mutations apply to memory immediately and are queued for
/// the store's writer task, so they never fail and never wait on storage.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    shared: Arc<Shared>,
    writer: mpsc::UnboundedSender<Command>,
}

impl CartStore {
    /// Create a store and start loading the persisted cart in the background.
    ///
    /// Until the load finishes, [`products`](Self::products) reads whatever
    /// is in memory, which starts out empty. Await
    /// [`wait_loaded`](Self::wait_loaded) to observe the persisted cart.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<S>(storage: S, options: CartOptions) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let shared = Arc::new(Shared::new(options));
        let (writer, commands) = mpsc::unbounded_channel();
        tokio::spawn(writer::run(storage, Arc::clone(&shared), commands));

        Self {
            inner: Arc::new(CartStoreInner { shared, writer }),
        }
    }

    /// Create a store and wait for its load step.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptPayload` if the persisted cart is malformed
    /// and the store is configured with `MalformedPayload::Fail`.
    pub async fn open<S>(storage: S, options: CartOptions) -> Result<Self>
    where
        S: KeyValueStore + 'static,
    {
        let store = Self::new(storage, options);
        store.wait_loaded().await?;
        Ok(store)
    }

    /// The options this store was created with.
    #[must_use]
    pub fn options(&self) -> &CartOptions {
        &self.inner.shared.options
    }

    /// Snapshot of the current line items.
    #[must_use]
    pub fn products(&self) -> Vec<LineItem> {
        self.inner.shared.cart.borrow().items().to_vec()
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.shared.cart.borrow().clone()
    }

    /// The line item with the given id, if present.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<LineItem> {
        self.inner.shared.cart.borrow().find(id).cloned()
    }

    /// Item count and subtotal of the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.inner.shared.cart.borrow().summary()
    }

    /// Observe cart changes.
    ///
    /// The receiver is notified after every mutation and after the load step
    /// replaces the cart.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.shared.cart.subscribe()
    }

    /// Whether the load step has completed successfully.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        *self.inner.shared.load.borrow() == LoadState::Ready
    }

    /// Wait for the load step to finish.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptPayload` if the load step rejected the
    /// persisted cart, or `CartError::WriterClosed` if the writer task died
    /// before finishing it.
    #[instrument(skip(self), fields(key = %self.options().storage_key))]
    pub async fn wait_loaded(&self) -> Result<()> {
        let mut load = self.inner.shared.load.subscribe();

        let state = tokio::select! {
            result = load.wait_for(|state| *state != LoadState::Pending) => {
                result.map(|state| (*state).clone()).map_err(|_| CartError::WriterClosed)?
            }
            () = self.inner.writer.closed() => {
                // The writer may have finished the load just before exiting.
                let state = self.inner.shared.load.borrow().clone();
                if state == LoadState::Pending {
                    return Err(CartError::WriterClosed);
                }
                state
            }
        };

        match state {
            LoadState::Failed(reason) => Err(CartError::CorruptPayload(reason)),
            LoadState::Ready | LoadState::Pending => Ok(()),
        }
    }

    /// Wait until every mutation made before this call has been handed to
    /// storage. Write failures are not reported here.
    ///
    /// # Errors
    ///
    /// Returns `CartError::WriterClosed` if the writer task is gone.
    #[instrument(skip(self), fields(key = %self.options().storage_key))]
    pub async fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.inner
            .writer
            .send(Command::Flush(ack))
            .map_err(|_| CartError::WriterClosed)?;
        done.await.map_err(|_| CartError::WriterClosed)
    }

    /// Add one unit of a product.
    ///
    /// An existing line keeps its position and takes the incoming title,
    /// image and price; a new line is appended with quantity 1.
    pub fn add_to_cart(&self, item: NewLineItem) {
        debug!(id = %item.id, "Adding to cart");
        self.mutate(|cart| cart.add(item));
    }

    /// Add one unit to the line with this id. Unknown ids are ignored.
    pub fn increment(&self, id: &ProductId) {
        debug!(id = %id, "Incrementing cart line");
        self.mutate(|cart| {
            cart.increment(id);
        });
    }

    /// Remove one unit from the line with this id. Unknown ids are ignored.
    ///
    /// Under the default policy the line stays in the cart at zero and may go
    /// negative.
    pub fn decrement(&self, id: &ProductId) {
        debug!(id = %id, "Decrementing cart line");
        let policy = self.options().decrement_policy;
        self.mutate(|cart| {
            cart.decrement(id, policy);
        });
    }

    /// Apply a change and queue the result while still holding the cart lock,
    /// so queue order matches mutation order.
    fn mutate(&self, change: impl FnOnce(&mut Cart)) {
        let writer = &self.inner.writer;
        self.inner.shared.cart.send_modify(|cart| {
            change(cart);
            match cart.to_json() {
                Ok(payload) => {
                    if writer.send(Command::Persist(payload)).is_err() {
                        warn!("Cart writer has shut down, change kept in memory only");
                    }
                }
                Err(e) => warn!(error = %e, "Failed to serialize cart, change kept in memory only"),
            }
        });
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("storage_key", &self.options().storage_key)
            .field("loaded", &self.is_loaded())
            .field("line_count", &self.inner.shared.cart.borrow().len())
            .finish_non_exhaustive()
    }
}
