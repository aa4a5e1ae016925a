//! Keyed debouncer.
//!
//! `schedule(key, payload)` (re)starts the key's timer; once the key has
//! been quiet for the whole delay, the most recent payload is emitted on
//! the receiver returned by [`Debouncer::new`].

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type Pending<K> = Arc<Mutex<HashMap<K, (u64, JoinHandle<()>)>>>;

/// Collapses bursts of calls per key into one emission.
pub struct Debouncer<K, P> {
    delay: Duration,
    pending: Pending<K>,
    next_generation: u64,
    tx: mpsc::UnboundedSender<(K, P)>,
}

impl<K, P> Debouncer<K, P>
where
    K: Eq + Hash + Clone + Send + 'static,
    P: Send + 'static,
{
    /// Create a debouncer and the receiver its emissions arrive on.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<(K, P)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_generation: 0,
            tx,
        };
        (debouncer, rx)
    }

    /// Schedule `payload` for `key`, replacing anything pending for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, key: K, payload: P) {
        self.next_generation += 1;
        let generation = self.next_generation;

        let pending = Arc::clone(&self.pending);
        let tx = self.tx.clone();
        let delay = self.delay;
        let task_key = key.clone();

        let mut guard = self.pending.lock();
        if let Some((_, previous)) = guard.remove(&key) {
            previous.abort();
        }

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // A newer schedule may have replaced this timer after it woke.
            let current = {
                let mut pending = pending.lock();
                match pending.get(&task_key) {
                    Some((g, _)) if *g == generation => {
                        pending.remove(&task_key);
                        true
                    }
                    _ => false,
                }
            };

            if current {
                let _ = tx.send((task_key, payload));
            }
        });

        guard.insert(key, (generation, handle));
    }

    /// Number of keys waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl<K, P> Drop for Debouncer<K, P> {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.pending.lock().drain() {
            handle.abort();
        }
    }
}
