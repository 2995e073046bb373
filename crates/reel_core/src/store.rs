//! Reel Store - observable values with explicit subscriptions
//!
//! A [`Store<T>`] holds one value and a set of subscribers. Every write
//! notifies all subscribers with the new value. Components use a store to
//! broadcast their state to descendants instead of threading it through an
//! implicit context.
//!
//! # Example
//!
//! ```ignore
//! use reel_core::store::Store;
//!
//! #[derive(Clone, Default)]
//! struct TabState {
//!     current_tab: String,
//! }
//!
//! let store = Store::new(TabState::default());
//!
//! // Subscribe to changes
//! let handle = store.subscribe(|state| {
//!     println!("tab is now {}", state.current_tab);
//! });
//!
//! // Replace state (notifies the subscriber)
//! store.set(TabState { current_tab: "settings".into() });
//!
//! // Stop listening
//! store.unsubscribe(&handle);
//! ```

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, PoisonError, RwLock};

new_key_type! {
    /// Identifier of a store subscriber
    pub struct SubscriptionId;
}

type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// An observable value
pub struct Store<T: Clone + Send + Sync + 'static> {
    /// Current value
    value: RwLock<T>,
    /// Callbacks invoked after every write
    subscribers: RwLock<SlotMap<SubscriptionId, Subscriber<T>>>,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    /// Create a store holding `initial`
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            subscribers: RwLock::new(SlotMap::with_key()),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the value and notify subscribers
    pub fn set(&self, value: T) {
        {
            let mut current = self.value.write().unwrap_or_else(PoisonError::into_inner);
            *current = value.clone();
        }
        self.notify_subscribers(&value);
    }

    /// Subscribe to value changes
    ///
    /// The callback runs after every write, on the writing thread. Keep the
    /// returned handle to unsubscribe later.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Arc::new(callback));
        SubscriptionHandle { id }
    }

    /// Remove a subscriber
    ///
    /// Returns `false` if the subscription was already removed.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle.id)
            .is_some()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn notify_subscribers(&self, value: &T) {
        // Callbacks are cloned out so they can subscribe or write re-entrantly
        let callbacks: Vec<Subscriber<T>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(value);
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.get())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle for unsubscribing from store updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: SubscriptionId,
}
