//! Change notification channel
//!
//! - [`Observable`]: a value that broadcasts every change to its subscribers.
//! - [`EventStream`]: a valueless broadcast for one-shot events.
//! - [`Subscription`]: handle that keeps a callback registered; drop it to
//!   unsubscribe.
//!
//! Deliveries never run inside the mutating call. Each change posts one job
//! per live subscriber onto the [`MainContext`], so subscribers of the same
//! field see values in the order they were set and in registration order.
//! Callbacks are held weakly by the channel: a delivery already queued when
//! its subscription is dropped is skipped.

use crate::context::MainContext;
use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Slot<T> {
    callback: Box<dyn Fn(&T) + Send + Sync>,
}

/// Keeps a callback registered for as long as it is held
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _slot: Arc<dyn Any + Send + Sync>,
}

impl Subscription {
    /// Stop receiving notifications
    pub fn unsubscribe(self) {}
}

struct Subscribers<T> {
    context: MainContext,
    slots: Mutex<Vec<Weak<Slot<T>>>>,
}

impl<T: Clone + Send + 'static> Subscribers<T> {
    fn new(context: MainContext) -> Self {
        Self {
            context,
            slots: Mutex::new(Vec::new()),
        }
    }

    fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let slot = Arc::new(Slot {
            callback: Box::new(callback),
        });
        lock(&self.slots).push(Arc::downgrade(&slot));
        Subscription { _slot: slot }
    }

    fn broadcast(&self, value: &T) {
        let mut slots = lock(&self.slots);
        slots.retain(|slot| slot.strong_count() > 0);
        for slot in slots.iter() {
            let slot = slot.clone();
            let value = value.clone();
            self.context.post(move || {
                if let Some(slot) = slot.upgrade() {
                    (slot.callback)(&value);
                }
            });
        }
    }

    fn live_count(&self) -> usize {
        lock(&self.slots)
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}

/// A value whose changes are delivered to subscribers on the execution context
pub struct Observable<T> {
    value: Mutex<T>,
    subscribers: Subscribers<T>,
}

impl<T: Clone + PartialEq + Send + 'static> Observable<T> {
    pub fn new(context: MainContext, initial: T) -> Self {
        Self {
            value: Mutex::new(initial),
            subscribers: Subscribers::new(context),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        lock(&self.value).clone()
    }

    /// Replace the value and notify subscribers if it changed
    ///
    /// # Returns
    /// `true` if the value differed from the previous one
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = lock(&self.value);
            if *current == value {
                return false;
            }
            *current = value.clone();
        }
        self.subscribers.broadcast(&value);
        true
    }

    /// Like [`set`](Self::set), but clones `value` only when it differs
    pub fn set_from(&self, value: &T) -> bool {
        {
            let mut current = lock(&self.value);
            if *current == *value {
                return false;
            }
            current.clone_from(value);
        }
        self.subscribers.broadcast(value);
        true
    }

    /// Register a callback for future changes
    ///
    /// The current value is not replayed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Number of subscriptions still alive
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.live_count()
    }
}

/// Broadcast channel for discrete events that carry no retained state
pub struct EventStream<T> {
    subscribers: Subscribers<T>,
}

impl<T: Clone + Send + 'static> EventStream<T> {
    pub fn new(context: MainContext) -> Self {
        Self {
            subscribers: Subscribers::new(context),
        }
    }

    /// Deliver `event` to every live subscriber
    pub fn emit(&self, event: T) {
        self.subscribers.broadcast(&event);
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextLoop;

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |value: &T| sink.lock().unwrap().push(value.clone()))
    }

    fn setup() -> (MainContext, ContextLoop) {
        MainContext::new()
    }

    #[test]
    fn test_set_delivers_after_loop_runs() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, 0);
        let (seen, callback) = recorder::<i32>();
        let _subscription = observable.subscribe(callback);

        assert!(observable.set(5));
        // Nothing is delivered inside the mutating call
        assert!(seen.lock().unwrap().is_empty());

        context_loop.run_until_idle();
        assert_eq!(*seen.lock().unwrap(), vec![5]);
        assert_eq!(observable.get(), 5);
    }

    #[test]
    fn test_setting_same_value_is_silent() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, "a".to_string());
        let (seen, callback) = recorder::<String>();
        let _subscription = observable.subscribe(callback);

        assert!(!observable.set("a".to_string()));
        assert_eq!(context_loop.run_until_idle(), 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_set_from_skips_equal_value() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, vec![1, 2, 3]);
        let (seen, callback) = recorder::<Vec<i32>>();
        let _subscription = observable.subscribe(callback);

        assert!(!observable.set_from(&vec![1, 2, 3]));
        assert_eq!(context_loop.run_until_idle(), 0);

        assert!(observable.set_from(&vec![1, 2]));
        context_loop.run_until_idle();
        assert_eq!(*seen.lock().unwrap(), vec![vec![1, 2]]);
        assert_eq!(observable.get(), vec![1, 2]);
    }

    #[test]
    fn test_values_arrive_in_order() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, 0);
        let (seen, callback) = recorder::<i32>();
        let _subscription = observable.subscribe(callback);

        observable.set(1);
        observable.set(2);
        observable.set(3);
        context_loop.run_until_idle();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_registration_order_across_subscribers() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, 0);
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = order.clone();
        let _a = observable.subscribe(move |v: &i32| first.lock().unwrap().push(("a", *v)));
        let second = order.clone();
        let _b = observable.subscribe(move |v: &i32| second.lock().unwrap().push(("b", *v)));

        observable.set(7);
        context_loop.run_until_idle();

        assert_eq!(*order.lock().unwrap(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn test_dropped_subscription_stops_delivery() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, 0);
        let (seen, callback) = recorder::<i32>();
        let subscription = observable.subscribe(callback);
        assert_eq!(observable.subscriber_count(), 1);

        observable.set(1);
        context_loop.run_until_idle();
        subscription.unsubscribe();
        observable.set(2);
        context_loop.run_until_idle();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn test_queued_delivery_skipped_after_unsubscribe() {
        let (context, mut context_loop) = setup();
        let observable = Observable::new(context, 0);
        let (seen, callback) = recorder::<i32>();
        let subscription = observable.subscribe(callback);

        observable.set(1);
        drop(subscription);
        context_loop.run_until_idle();

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_event_stream_emits_every_time() {
        let (context, mut context_loop) = setup();
        let events = EventStream::new(context);
        let (seen, callback) = recorder::<()>();
        let _subscription = events.subscribe(callback);

        events.emit(());
        events.emit(());
        context_loop.run_until_idle();

        assert_eq!(seen.lock().unwrap().len(), 2);
        assert_eq!(events.subscriber_count(), 1);
    }
}
