use std::collections::VecDeque;

use foundation::time::Time;

/// An event stamped with the logical time it was emitted at.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<E> {
    pub time: Time,
    pub payload: E,
}

pub type Listener<E> = Box<dyn FnMut(&Event<E>)>;

/// Records recent events and forwards each one to an optional listener.
///
/// The record is bounded; the oldest events are dropped first.
pub struct EventBus<E> {
    events: VecDeque<Event<E>>,
    capacity: usize,
    listener: Option<Listener<E>>,
}

impl<E> EventBus<E> {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
            listener: None,
        }
    }

    pub fn set_listener(&mut self, listener: impl FnMut(&Event<E>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn emit(&mut self, time: Time, payload: E) {
        let event = Event { time, payload };
        if let Some(listener) = self.listener.as_mut() {
            listener(&event);
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn events(&self) -> impl Iterator<Item = &Event<E>> + '_ {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event<E>> {
        self.events.drain(..).collect()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.events)
            .field("capacity", &self.capacity)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;
    use foundation::time::Time;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn records_events_with_time() {
        let mut bus = EventBus::new();
        bus.emit(Time(2), "hello");
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.events().next().unwrap().time, Time(2));
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(Time(0), "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn listener_sees_every_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut bus = EventBus::new();
        bus.set_listener(move |e| sink.borrow_mut().push(e.payload));
        bus.emit(Time(0), 1);
        bus.emit(Time(1), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn record_is_bounded() {
        let mut bus = EventBus::with_capacity(2);
        bus.emit(Time(0), 'a');
        bus.emit(Time(1), 'b');
        bus.emit(Time(2), 'c');
        let kept: Vec<char> = bus.events().map(|e| e.payload).collect();
        assert_eq!(kept, vec!['b', 'c']);
    }
}
