//! Observable value cell with multicast listeners.
//!
//! DESIGN
//! ======
//! A single current value plus a registry of listeners. Subscribing delivers
//! the current value immediately, then every later `set`. Listeners are
//! invoked synchronously on the mutating thread, after the cell's lock has
//! been released, so a listener may read (or even mutate) the cell again.
//!
//! There is no history: a late subscriber only ever sees the value current at
//! subscription time followed by subsequent changes.

#[cfg(test)]
#[path = "observable_test.rs"]
mod observable_test;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Cell<T> {
    value: T,
    listeners: Vec<(u64, Listener<T>)>,
    next_id: u64,
}

struct Shared<T> {
    cell: Mutex<Cell<T>>,
    delivery: Mutex<()>,
}

/// Shared, observable value. Clones share the same underlying cell.
pub struct Observable<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T> Observable<T>
where
    T: Clone + Send + 'static,
{
    #[must_use]
    pub fn new(value: T) -> Self {
        let cell = Cell { value, listeners: Vec::new(), next_id: 0 };
        Self { shared: Arc::new(Shared { cell: Mutex::new(cell), delivery: Mutex::new(()) }) }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().value)
    }

    /// Replace the value and notify every registered listener in
    /// registration order.
    pub fn set(&self, value: T) {
        let _delivery = self.deliver_lock();
        let (current, listeners) = {
            let mut cell = self.lock();
            cell.value = value;
            let listeners: Vec<Listener<T>> = cell
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (cell.value.clone(), listeners)
        };
        for listener in listeners {
            listener(&current);
        }
    }

    /// Register `f`. It is called once right away with the current value and
    /// then after every `set`, until the returned [`Subscription`] is dropped.
    pub fn subscribe<F>(&self, f: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let listener: Listener<T> = Arc::new(f);
        let delivery = self.deliver_lock();
        let (id, current) = {
            let mut cell = self.lock();
            let id = cell.next_id;
            cell.next_id += 1;
            cell.listeners.push((id, Arc::clone(&listener)));
            (id, cell.value.clone())
        };
        listener(&current);
        drop(delivery);

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    let mut cell = shared.cell.lock().unwrap_or_else(PoisonError::into_inner);
                    cell.listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Cell<T>> {
        self.shared.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Held for a whole notification round; always taken before the value lock.
    fn deliver_lock(&self) -> MutexGuard<'_, ()> {
        self.shared.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Observable<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = self.shared.cell.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Observable")
            .field("value", &cell.value)
            .field("listeners", &cell.listeners.len())
            .finish()
    }
}

/// Handle for a registered listener. Dropping it unregisters the listener.
#[must_use = "dropping a Subscription immediately unregisters its listener"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Keep the listener registered for as long as the cell lives.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
