//! The persistence task.
//!
//! One task per store owns the storage backend. It first runs the load step,
//! then writes snapshots in the order mutations queued them. A burst of
//! queued snapshots collapses to the newest one, since each snapshot is the
//! whole cart.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::cart::Cart;
use crate::options::{CartOptions, MalformedPayload};
use crate::storage::KeyValueStore;

/// Work queued for the writer.
#[derive(Debug)]
pub enum Command {
    /// Persist this serialized cart.
    Persist(String),
    /// Signal once everything queued before this command has been handled.
    Flush(oneshot::Sender<()>),
}

/// Progress of the load step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed(String),
}

/// State shared between store handles and the writer task.
#[derive(Debug)]
pub struct Shared {
    pub cart: watch::Sender<Cart>,
    pub load: watch::Sender<LoadState>,
    pub options: CartOptions,
}

impl Shared {
    pub fn new(options: CartOptions) -> Self {
        let (cart, _) = watch::channel(Cart::new());
        let (load, _) = watch::channel(LoadState::Pending);
        Self {
            cart,
            load,
            options,
        }
    }
}

/// Commands drained from the queue in one go.
#[derive(Default)]
struct Batch {
    latest: Option<String>,
    superseded: usize,
    acks: Vec<oneshot::Sender<()>>,
}

impl Batch {
    fn absorb(&mut self, command: Command) {
        match command {
            Command::Persist(payload) => {
                if self.latest.replace(payload).is_some() {
                    self.superseded += 1;
                }
            }
            Command::Flush(ack) => self.acks.push(ack),
        }
    }

    fn ack(self) {
        for ack in self.acks {
            // The flusher may have stopped waiting.
            let _ = ack.send(());
        }
    }
}

/// Run the load step, then serve writes until every store handle is dropped.
pub async fn run<S: KeyValueStore>(
    storage: S,
    shared: Arc<Shared>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let key = shared.options.storage_key.clone();
    let persisting = load(&storage, &shared, &mut commands).await;

    while let Some(command) = commands.recv().await {
        let mut batch = Batch::default();
        batch.absorb(command);
        while let Ok(command) = commands.try_recv() {
            batch.absorb(command);
        }

        if let Some(payload) = batch.latest.take() {
            if persisting {
                debug!(key = %key, superseded = batch.superseded, "Persisting cart");
                if let Err(e) = storage.set(&key, &payload).await {
                    warn!(key = %key, error = %e, "Failed to persist cart");
                }
            } else {
                debug!(key = %key, "Persistence disabled after load failure, dropping snapshot");
            }
        }

        batch.ack();
    }

    debug!(key = %key, "Cart writer stopped");
}

/// Read the persisted cart into memory. Returns whether writes may proceed.
async fn load<S: KeyValueStore>(
    storage: &S,
    shared: &Shared,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> bool {
    let key = &shared.options.storage_key;

    let payload = match storage.get(key).await {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            debug!(key = %key, "No persisted cart");
            shared.load.send_replace(LoadState::Ready);
            return true;
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted cart, keeping in-memory cart");
            shared.load.send_replace(LoadState::Ready);
            return true;
        }
    };

    match Cart::from_json(&payload) {
        Ok(cart) => {
            let line_count = cart.len();
            let mut acks = Vec::new();
            shared.cart.send_modify(|current| {
                *current = cart;
                // Snapshots queued so far describe a cart that was just replaced.
                while let Ok(command) = commands.try_recv() {
                    if let Command::Flush(ack) = command {
                        acks.push(ack);
                    }
                }
            });
            shared.load.send_replace(LoadState::Ready);
            for ack in acks {
                let _ = ack.send(());
            }
            info!(key = %key, line_count, "Loaded persisted cart");
            true
        }
        Err(e) => match shared.options.malformed_payload {
            MalformedPayload::Discard => {
                warn!(key = %key, error = %e, "Discarding malformed persisted cart");
                shared.load.send_replace(LoadState::Ready);
                true
            }
            MalformedPayload::Fail => {
                // Pre-load mutations stay in memory; nothing is written.
                error!(key = %key, error = %e, "Malformed persisted cart, persistence disabled");
                shared.load.send_replace(LoadState::Failed(e.to_string()));
                false
            }
        },
    }
}
