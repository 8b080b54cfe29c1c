use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;
type Subscribers<T> = RwLock<Vec<(usize, Subscriber<T>)>>;

/// A thread-safe store for managing application state.
///
/// Every mutation bumps a version counter and notifies subscribers with the
/// new state. Cloning a store yields another handle onto the same state.
pub struct Store<T> {
    state: Arc<RwLock<T>>,
    version: Arc<AtomicU64>,
    subscribers: Arc<Subscribers<T>>,
    next_subscriber: Arc<AtomicUsize>,
}

impl<T: Clone + 'static> Store<T> {
    /// Create a new store with the given initial state.
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            version: Arc::new(AtomicU64::new(0)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_subscriber: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get a clone of the current state.
    pub fn get(&self) -> T {
        self.state.read().clone()
    }

    /// Update the state using a function, returning whatever it returns.
    ///
    /// The write lock is released before subscribers run, so they may read
    /// the store freely.
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut state = self.state.write();
            let result = f(&mut *state);
            self.version.fetch_add(1, Ordering::SeqCst);
            result
        };
        self.notify();
        result
    }

    /// Set a new state value.
    pub fn set(&self, new_state: T) {
        self.update(|state| *state = new_state);
    }

    /// Read state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.state.read();
        f(&*state)
    }

    /// Read state together with the version it was observed at.
    pub(crate) fn read_versioned<F, R>(&self, f: F) -> (u64, R)
    where
        F: FnOnce(&T) -> R,
    {
        let state = self.state.read();
        (self.version.load(Ordering::SeqCst), f(&*state))
    }

    /// Number of mutations applied since the store was created.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Subscribe to state changes.
    ///
    /// The callback runs after every update until the returned
    /// [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self.next_subscriber.fetch_add(1, Ordering::SeqCst);
        self.subscribers.write().push((id, Arc::new(callback)));

        let subscribers: Weak<Subscribers<T>> = Arc::downgrade(&self.subscribers);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(subscribers) = subscribers.upgrade() {
                    subscribers.write().retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Notify all subscribers of a state change.
    ///
    /// Callbacks run with no lock held, so they may subscribe, drop their
    /// own `Subscription` or update the store.
    fn notify(&self) {
        let subscribers: Vec<Subscriber<T>> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        if subscribers.is_empty() {
            return;
        }
        let snapshot = self.get();
        for subscriber in subscribers {
            subscriber(&snapshot);
        }
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            version: Arc::clone(&self.version),
            subscribers: Arc::clone(&self.subscribers),
            next_subscriber: Arc::clone(&self.next_subscriber),
        }
    }
}

impl<T: Default + Clone + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// RAII guard for a store subscription.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}
