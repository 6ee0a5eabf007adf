//! Typed callback registry.
//!
//! Listeners are identified by the [`Subscription`] handle returned when
//! they are added, never by function identity, so registering the same
//! closure twice yields two independent subscriptions.

use std::fmt;

/// Whether a dispatch should continue to lower-priority listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    /// Keep dispatching.
    #[default]
    Continue,
    /// Stop after this listener.
    Stop,
}

impl From<()> for Propagation {
    fn from((): ()) -> Self {
        Self::Continue
    }
}

/// Handle identifying one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Binding<T> {
    id: u64,
    priority: i32,
    once: bool,
    listener: Box<dyn FnMut(&T) -> Propagation>,
}

/// A set of listeners receiving `&T` payloads.
///
/// Higher priority listeners run first. Among equal priorities the most
/// recently added runs first.
pub struct Signal<T> {
    bindings: Vec<Binding<T>>,
    next_id: u64,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Signal<T> {
    /// Signal with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener with priority 0.
    pub fn add<F, R>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&T) -> R + 'static,
        R: Into<Propagation>,
    {
        self.register(listener, 0, false)
    }

    /// Add a listener with an explicit priority.
    pub fn add_with_priority<F, R>(
        &mut self,
        listener: F,
        priority: i32,
    ) -> Subscription
    where
        F: FnMut(&T) -> R + 'static,
        R: Into<Propagation>,
    {
        self.register(listener, priority, false)
    }

    /// Add a listener that is removed after its first call.
    pub fn add_once<F, R>(&mut self, listener: F) -> Subscription
    where
        F: FnMut(&T) -> R + 'static,
        R: Into<Propagation>,
    {
        self.register(listener, 0, true)
    }

    fn register<F, R>(
        &mut self,
        mut listener: F,
        priority: i32,
        once: bool,
    ) -> Subscription
    where
        F: FnMut(&T) -> R + 'static,
        R: Into<Propagation>,
    {
        let id = self.next_id;
        self.next_id += 1;

        // Dispatch walks from the back, so keep the vector sorted by
        // ascending priority and insert after every equal-priority binding.
        let position = self
            .bindings
            .iter()
            .position(|b| b.priority > priority)
            .unwrap_or(self.bindings.len());
        self.bindings.insert(
            position,
            Binding {
                id,
                priority,
                once,
                listener: Box::new(move |payload: &T| listener(payload).into()),
            },
        );
        Subscription(id)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn remove(&mut self, subscription: Subscription) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != subscription.0);
        self.bindings.len() != before
    }

    /// Remove every listener.
    pub fn remove_all(&mut self) {
        self.bindings.clear();
    }

    /// Whether `subscription` is still registered.
    #[must_use]
    pub fn contains(&self, subscription: Subscription) -> bool {
        self.bindings.iter().any(|b| b.id == subscription.0)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Call listeners in priority order until one returns
    /// [`Propagation::Stop`].
    pub fn dispatch(&mut self, payload: &T) {
        let mut index = self.bindings.len();
        while index > 0 {
            index -= 1;
            let propagation = (self.bindings[index].listener)(payload);
            if self.bindings[index].once {
                let _ = self.bindings.remove(index);
            }
            if propagation == Propagation::Stop {
                break;
            }
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("listeners", &self.bindings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, Signal<u32>) {
        (Rc::new(RefCell::new(Vec::new())), Signal::new())
    }

    #[test]
    fn dispatch_reaches_all_listeners() {
        let (log, mut signal) = recorder();
        let l = log.clone();
        let _ = signal.add(move |_: &u32| l.borrow_mut().push("a"));
        let l = log.clone();
        let _ = signal.add(move |_: &u32| l.borrow_mut().push("b"));

        signal.dispatch(&1);
        assert_eq!(*log.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn priority_orders_listeners() {
        let (log, mut signal) = recorder();
        let l = log.clone();
        let _ = signal.add_with_priority(move |_: &u32| l.borrow_mut().push("low"), -1);
        let l = log.clone();
        let _ = signal.add_with_priority(move |_: &u32| l.borrow_mut().push("high"), 5);
        let l = log.clone();
        let _ = signal.add(move |_: &u32| l.borrow_mut().push("zero"));

        signal.dispatch(&0);
        assert_eq!(*log.borrow(), vec!["high", "zero", "low"]);
    }

    #[test]
    fn stop_halts_dispatch() {
        let (log, mut signal) = recorder();
        let l = log.clone();
        let _ = signal.add(move |_: &u32| l.borrow_mut().push("never"));
        let l = log.clone();
        let _ = signal.add(move |value: &u32| {
            l.borrow_mut().push("first");
            if *value > 3 {
                Propagation::Stop
            } else {
                Propagation::Continue
            }
        });

        signal.dispatch(&10);
        assert_eq!(*log.borrow(), vec!["first"]);
        signal.dispatch(&1);
        assert_eq!(*log.borrow(), vec!["first", "first", "never"]);
    }

    #[test]
    fn once_listener_runs_once() {
        let count = Rc::new(RefCell::new(0));
        let mut signal = Signal::<()>::new();
        let c = count.clone();
        let sub = signal.add_once(move |(): &()| *c.borrow_mut() += 1);

        signal.dispatch(&());
        signal.dispatch(&());
        assert_eq!(*count.borrow(), 1);
        assert!(!signal.contains(sub));
        assert!(signal.is_empty());
    }

    #[test]
    fn same_closure_twice_is_two_subscriptions() {
        let count = Rc::new(RefCell::new(0));
        let mut signal = Signal::<u32>::new();
        let c = count.clone();
        let listener = move |_: &u32| *c.borrow_mut() += 1;
        let first = signal.add(listener.clone());
        let second = signal.add(listener);
        assert_ne!(first, second);

        assert!(signal.remove(first));
        assert!(!signal.remove(first));
        signal.dispatch(&0);
        assert_eq!(*count.borrow(), 1);
        assert!(signal.contains(second));

        signal.remove_all();
        assert_eq!(signal.len(), 0);
    }
}
