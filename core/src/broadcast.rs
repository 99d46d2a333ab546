use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// Synchronous fan-out to a set of callback listeners. Listeners are invoked
/// without the registry lock held, so a callback may subscribe or unsubscribe
/// re-entrantly without deadlocking.
pub struct Broadcast<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    listeners: RwLock<HashMap<usize, Arc<dyn Fn(&T) + Send + Sync>>>,
    next_id: AtomicUsize,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T> Default for Broadcast<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Broadcast<T> {
    pub fn new() -> Self { Self { inner: Arc::new(Inner { listeners: RwLock::new(HashMap::new()), next_id: AtomicUsize::new(0) }) } }

    /// Register a listener. Dropping the returned guard unsubscribes it.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionGuard<T> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().unwrap().insert(id, Arc::new(listener));
        SubscriptionGuard { inner: Arc::downgrade(&self.inner), id }
    }

    pub fn send(&self, value: &T) {
        // Snapshot the listeners so callbacks run lock-free
        let listeners: Vec<_> = self.inner.listeners.read().unwrap().values().cloned().collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize { self.inner.listeners.read().unwrap().len() }
}

/// Unsubscribes its listener on drop. Holding the guard does not keep the
/// broadcast alive.
pub struct SubscriptionGuard<T> {
    inner: Weak<Inner<T>>,
    id: usize,
}

impl<T> Drop for SubscriptionGuard<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().unwrap().remove(&self.id);
        }
    }
}
