//! Listener bookkeeping shared by stores, adapters and replicas.

use crate::sync::lock;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Removes the listener it was returned for. Calling it after the owner is
/// gone is a no-op.
pub type Unsubscribe = Box<dyn FnOnce() + Send + Sync>;

pub struct ListenerSet<T> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener<T>)>>,
    pending: Mutex<Pending<T>>,
}

struct Pending<T> {
    queue: VecDeque<T>,
    draining: bool,
}

/// Releases the drain if a listener panics mid-drain.
struct DrainGuard<'a, T> {
    pending: &'a Mutex<Pending<T>>,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if thread::panicking() {
            lock(self.pending).draining = false;
        }
    }
}

impl<T: Send + 'static> ListenerSet<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
            pending: Mutex::new(Pending {
                queue: VecDeque::new(),
                draining: false,
            }),
        })
    }

    pub fn add(self: &Arc<Self>, listener: Listener<T>) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((id, listener));

        let set = Arc::downgrade(self);
        Box::new(move || {
            if let Some(set) = set.upgrade() {
                lock(&set.listeners).retain(|(candidate, _)| *candidate != id);
            }
        })
    }

    /// Call every listener with `value`.
    ///
    /// Iterates over a copy of the list so a listener may unsubscribe itself
    /// or others without deadlocking.
    pub fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(value);
        }
    }

    /// Queue `value` for [`flush`](Self::flush).
    ///
    /// Call while still holding the lock that committed `value`, so the queue
    /// order is the commit order.
    pub fn enqueue(&self, value: T) {
        lock(&self.pending).queue.push_back(value);
    }

    /// Deliver queued values in order.
    ///
    /// Only one caller drains at a time; a concurrent or re-entrant caller
    /// returns at once and its values are delivered by the active drainer.
    pub fn flush(&self) {
        {
            let mut pending = lock(&self.pending);
            if pending.draining {
                return;
            }
            pending.draining = true;
        }
        let _guard = DrainGuard {
            pending: &self.pending,
        };

        loop {
            let value = {
                let mut pending = lock(&self.pending);
                match pending.queue.pop_front() {
                    Some(value) => value,
                    None => {
                        // Released under the same lock an enqueuer takes,
                        // so nothing is left behind.
                        pending.draining = false;
                        return;
                    }
                }
            };
            self.notify(&value);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.listeners).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
