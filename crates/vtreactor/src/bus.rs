use std::any::{Any, TypeId};
use std::collections::HashMap;

type Subscriber<E> = Box<dyn FnMut(&E)>;

trait ErasedSubscribers: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Subscribers<E: 'static> {
    handlers: Vec<Subscriber<E>>,
}

impl<E: 'static> ErasedSubscribers for Subscribers<E> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A typed publish/subscribe registry.
///
/// Subscribers are registered per concrete event type `E` and are invoked,
/// in registration order, every time a value of that type is published.
/// There is no cross-thread delivery: publishing and subscribing both
/// happen on whichever thread owns the `Bus`.
#[derive(Default)]
pub struct Bus {
    subscribers: HashMap<TypeId, Box<dyn ErasedSubscribers>>,
}

impl Bus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler invoked on every future `publish::<E>`.
    pub fn subscribe<E: 'static>(&mut self, handler: impl FnMut(&E) + 'static) {
        let entry = self
            .subscribers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| {
                Box::new(Subscribers::<E> {
                    handlers: Vec::new(),
                })
            });
        let subs = entry
            .as_any_mut()
            .downcast_mut::<Subscribers<E>>()
            .expect("TypeId keys the correct Subscribers<E>");
        subs.handlers.push(Box::new(handler));
    }

    /// Publish an event to every subscriber of its type, in registration
    /// order. A no-op if nothing is subscribed to `E`.
    pub fn publish<E: 'static>(&mut self, event: &E) {
        let Some(entry) = self.subscribers.get_mut(&TypeId::of::<E>()) else {
            return;
        };
        let subs = entry
            .as_any_mut()
            .downcast_mut::<Subscribers<E>>()
            .expect("TypeId keys the correct Subscribers<E>");
        for handler in &mut subs.handlers {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Bus;
    use pretty_assertions::assert_eq;

    struct Resize {
        cols: u16,
        rows: u16,
    }

    struct Refresh;

    #[test]
    fn dispatches_to_matching_type_only() {
        let mut bus = Bus::new();
        let seen_resize = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let seen_refresh = std::rc::Rc::new(std::cell::Cell::new(0u32));

        let r = seen_resize.clone();
        bus.subscribe::<Resize>(move |e: &Resize| r.borrow_mut().push((e.cols, e.rows)));
        let c = seen_refresh.clone();
        bus.subscribe::<Refresh>(move |_: &Refresh| c.set(c.get() + 1));

        bus.publish(&Resize { cols: 80, rows: 24 });
        bus.publish(&Refresh);
        bus.publish(&Resize { cols: 100, rows: 40 });

        assert_eq!(*seen_resize.borrow(), vec![(80, 24), (100, 40)]);
        assert_eq!(seen_refresh.get(), 1);
    }

    #[test]
    fn publish_without_subscribers_is_a_noop() {
        let mut bus = Bus::new();
        bus.publish(&Refresh);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let mut bus = Bus::new();
        let order = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));

        let o1 = order.clone();
        bus.subscribe::<Refresh>(move |_: &Refresh| o1.borrow_mut().push(1));
        let o2 = order.clone();
        bus.subscribe::<Refresh>(move |_: &Refresh| o2.borrow_mut().push(2));

        bus.publish(&Refresh);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }
}
