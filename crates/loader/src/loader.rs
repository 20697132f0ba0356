//! The batching loader.
//!
//! State is a slot map plus a pending-key queue behind a mutex. The first
//! key enqueued after an idle period schedules a dispatch task; the task
//! yields back to the scheduler once, so every lookup that can be issued
//! synchronously in the current tick lands in the same batch, then seals the
//! batch and issues exactly one store call for it.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::oneshot;

use crate::source::BatchSource;

enum Slot<V> {
    /// Keyed lookup is queued or in flight; senders wake the waiting paths.
    Waiting(Vec<oneshot::Sender<Option<V>>>),
    /// Result is memoized for the rest of the request.
    Settled(Option<V>),
}

struct LoaderState<K, V> {
    slots: HashMap<K, Slot<V>>,
    queue: Vec<K>,
    dispatch_scheduled: bool,
}

impl<K, V> Default for LoaderState<K, V> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            queue: Vec::new(),
            dispatch_scheduled: false,
        }
    }
}

/// Request-scoped coalescing loader for one entity kind.
///
/// `load` never returns an error: a missing row and a failed batch both
/// resolve to `None`, matching the tolerant field-resolution semantics of
/// the query surface. Failed batches are reported through `tracing`.
pub struct Loader<B: BatchSource> {
    source: Arc<B>,
    state: Arc<Mutex<LoaderState<B::Key, B::Value>>>,
}

impl<B: BatchSource> Loader<B> {
    pub fn new(source: Arc<B>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(LoaderState::default())),
        }
    }

    /// Look up one key, coalescing with every other in-flight lookup of this
    /// kind in the same request.
    ///
    /// Suspends only the calling resolution path. Must be called from within
    /// a tokio runtime (the dispatch task is spawned on it).
    pub async fn load(&self, key: B::Key) -> Option<B::Value> {
        let rx = {
            let mut guard = match self.state.lock() {
                Ok(guard) => guard,
                Err(_) => return None,
            };
            let state = &mut *guard;

            match state.slots.entry(key.clone()) {
                Entry::Occupied(mut entry) => match entry.get_mut() {
                    Slot::Settled(value) => return value.clone(),
                    Slot::Waiting(waiters) => {
                        let (tx, rx) = oneshot::channel();
                        waiters.push(tx);
                        rx
                    }
                },
                Entry::Vacant(entry) => {
                    let (tx, rx) = oneshot::channel();
                    entry.insert(Slot::Waiting(vec![tx]));
                    state.queue.push(key);

                    if !state.dispatch_scheduled {
                        state.dispatch_scheduled = true;
                        // The task holds only a weak reference: if the
                        // owning request is cancelled and its context
                        // dropped before the window closes, the store call
                        // is never issued.
                        tokio::spawn(run_batch::<B>(
                            Arc::downgrade(&self.state),
                            Arc::clone(&self.source),
                        ));
                    }
                    rx
                }
            }
        };

        rx.await.ok().flatten()
    }
}

async fn run_batch<B: BatchSource>(
    state: Weak<Mutex<LoaderState<B::Key, B::Value>>>,
    source: Arc<B>,
) {
    // Micro-batching window: one yield lets every synchronously-issuable
    // lookup in the current tick enqueue before the batch is sealed.
    tokio::task::yield_now().await;

    let keys = {
        let Some(state) = state.upgrade() else {
            return;
        };
        let mut guard = match state.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };
        guard.dispatch_scheduled = false;
        std::mem::take(&mut guard.queue)
    };

    if keys.is_empty() {
        return;
    }

    tracing::debug!(kind = B::KIND, keys = keys.len(), "dispatching batch");

    let fetched = if keys.len() == 1 {
        // Single-key fast path; semantically identical to the set path.
        source.load_one(&keys[0]).await.map(|found| match found {
            Some(value) => vec![(keys[0].clone(), value)],
            None => Vec::new(),
        })
    } else {
        source.load_many(&keys).await
    };

    let mut results: HashMap<B::Key, B::Value> = match fetched {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(err) => {
            // Read paths are fail-soft: the whole batch degrades to "not
            // found" and the failure is only visible here.
            tracing::warn!(
                kind = B::KIND,
                keys = keys.len(),
                error = %err,
                "batch fetch failed, resolving batch as not found"
            );
            HashMap::new()
        }
    };

    let Some(state) = state.upgrade() else {
        return;
    };
    let mut guard = match state.lock() {
        Ok(guard) => guard,
        Err(_) => return,
    };

    for key in keys {
        let value = results.remove(&key);
        let waiters = match guard.slots.insert(key, Slot::Settled(value.clone())) {
            Some(Slot::Waiting(waiters)) => waiters,
            _ => Vec::new(),
        };
        for tx in waiters {
            let _ = tx.send(value.clone());
        }
    }
}
