use crate::store::Store;
use parking_lot::Mutex;
use std::sync::Arc;

/// A memoized value derived from a [`Store`].
///
/// The computation reruns only when the store version has moved since the
/// cached value was produced.
pub struct Memo<S, T> {
    store: Store<S>,
    compute: Arc<dyn Fn(&S) -> T + Send + Sync>,
    cached: Arc<Mutex<Option<(u64, T)>>>,
}

impl<S: Clone + 'static, T: Clone> Memo<S, T> {
    /// Create a new memo over `store`.
    ///
    /// `compute` runs under the store's read lock. It must not read the same
    /// store, directly or through another memo over it. Chain memos across
    /// stores instead.
    pub fn new<F>(store: &Store<S>, compute: F) -> Self
    where
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        Self {
            store: store.clone(),
            compute: Arc::new(compute),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the current value, recomputing if necessary.
    pub fn get(&self) -> T {
        let mut cached = self.cached.lock();
        if let Some((version, value)) = cached.as_ref() {
            if *version == self.store.version() {
                return value.clone();
            }
        }

        let (version, value) = self.store.read_versioned(|state| (self.compute)(state));
        *cached = Some((version, value.clone()));
        value
    }

    /// Whether the next [`get`](Self::get) will recompute.
    pub fn is_stale(&self) -> bool {
        match self.cached.lock().as_ref() {
            Some((version, _)) => *version != self.store.version(),
            None => true,
        }
    }
}

impl<S, T> Clone for Memo<S, T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            compute: Arc::clone(&self.compute),
            cached: Arc::clone(&self.cached),
        }
    }
}
