//! Ordered observer list with drop-to-unsubscribe handles.

use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

pub(crate) struct ListenerSet<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> ListenerSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub(crate) fn add(&self, listener: Listener<T>) -> Subscription {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .entries
                        .retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Calls every listener with `value`.
    ///
    /// The list is copied first so listeners may subscribe or unsubscribe
    /// re-entrantly.
    pub(crate) fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(value);
        }
    }

    pub(crate) fn clear(&self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

/// Handle returned by `subscribe`. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    /// Keeps the listener registered for the lifetime of the store.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

#[cfg(test)]
mod tests {
    use super::ListenerSet;
    use std::sync::{Arc, Mutex};

    #[test]
    fn notifies_in_registration_order_and_unsubscribes_on_drop() {
        let set = ListenerSet::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first_seen = Arc::clone(&seen);
        let first = set.add(Arc::new(move |value: &u32| {
            first_seen.lock().expect("lock").push(("first", *value));
        }));
        let second_seen = Arc::clone(&seen);
        let second = set.add(Arc::new(move |value: &u32| {
            second_seen.lock().expect("lock").push(("second", *value));
        }));

        set.notify(&1);
        drop(first);
        set.notify(&2);
        second.unsubscribe();
        set.notify(&3);

        assert_eq!(
            *seen.lock().expect("lock"),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let set = ListenerSet::<u32>::new();
        set.add(Arc::new(|_: &u32| {})).detach();
        assert_eq!(set.len(), 1);
        set.clear();
        assert_eq!(set.len(), 0);
    }
}
