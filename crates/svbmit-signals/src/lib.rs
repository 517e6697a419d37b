//! # svbmit-signals
//!
//! Push-based state sinks for svbmit. A form controller publishes a fresh
//! snapshot of its state into every configured sink whenever that state
//! changes. [`StateSink`] is the one-method contract the controller relies
//! on; [`Store`] is a writable store that remembers the latest value and
//! notifies subscribers, in the spirit of a UI framework's reactive store.
//!
//! ## Usage
//!
//! ```
//! use svbmit_signals::{StateSink, Store};
//! use std::sync::Arc;
//!
//! let store: Store<u32> = Store::new(0);
//!
//! store.subscribe("printer", Arc::new(|value: &u32| {
//!     println!("value is now {value}");
//! }));
//!
//! store.set(7);
//! assert_eq!(store.get(), 7);
//! ```

use std::sync::{Arc, RwLock};

/// Receives snapshots pushed by a form controller.
pub trait StateSink<T> {
    /// Replaces the sink's current value.
    fn set(&self, value: T);
}

impl<T, F> StateSink<T> for F
where
    F: Fn(T),
{
    fn set(&self, value: T) {
        self(value);
    }
}

/// The type signature for a store subscriber callback.
///
/// Subscribers must be `Send + Sync` so that a store handle can be shared
/// with whatever owns the rendering side.
pub type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct StoreInner<T> {
    value: RwLock<T>,
    subscribers: RwLock<Vec<(String, Subscriber<T>)>>,
}

/// A writable store holding the latest value and a list of subscribers.
///
/// `Store` is a cheap handle: clones share the same value and subscribers,
/// so one clone can be handed to a controller while another is read by the
/// UI layer.
///
/// # Examples
///
/// ```
/// use svbmit_signals::{StateSink, Store};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let store = Store::new(String::new());
/// let calls = Arc::new(AtomicUsize::new(0));
/// let c = calls.clone();
/// store.subscribe("counter", Arc::new(move |_v: &String| {
///     c.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// store.set("a".to_string());
/// store.update(|v| v.push('b'));
/// assert_eq!(store.get(), "ab");
/// assert_eq!(calls.load(Ordering::SeqCst), 2);
/// ```
pub struct Store<T: 'static> {
    inner: Arc<StoreInner<T>>,
}

impl<T: 'static> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Store<T> {
    /// Creates a new store with an initial value and no subscribers.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                value: RwLock::new(initial),
                subscribers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Subscribes a callback to value changes.
    ///
    /// If a subscriber with the same ID is already registered, it is replaced.
    pub fn subscribe(&self, subscriber_id: impl Into<String>, callback: Subscriber<T>) {
        let id = subscriber_id.into();
        let mut subscribers = self.inner.subscribers.write().expect("store lock poisoned");

        if let Some(entry) = subscribers.iter_mut().find(|(sid, _)| *sid == id) {
            entry.1 = callback;
        } else {
            subscribers.push((id, callback));
        }
    }

    /// Removes the subscriber with the given ID.
    ///
    /// Returns `true` if a subscriber was found and removed.
    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        let mut subscribers = self.inner.subscribers.write().expect("store lock poisoned");
        let len_before = subscribers.len();
        subscribers.retain(|(id, _)| id != subscriber_id);
        subscribers.len() < len_before
    }

    /// Returns the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().expect("store lock poisoned").len()
    }

    /// Calls `f` with a reference to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self.inner.value.read().expect("store lock poisoned");
        f(&value)
    }
}

impl<T: Clone + 'static> Store<T> {
    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.with(Clone::clone)
    }

    /// Mutates the stored value in place and notifies subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut value = self.inner.value.write().expect("store lock poisoned");
            f(&mut value);
        }
        self.notify();
    }

    fn notify(&self) {
        // No lock is held while subscribers run; a callback may write back.
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .subscribers
            .read()
            .expect("store lock poisoned")
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();
        let value = self.get();
        for subscriber in &subscribers {
            subscriber(&value);
        }
        tracing::trace!(subscribers = subscribers.len(), "store updated");
    }
}

impl<T: Clone + 'static> StateSink<T> for Store<T> {
    fn set(&self, value: T) {
        {
            let mut current = self.inner.value.write().expect("store lock poisoned");
            *current = value;
        }
        self.notify();
    }
}
