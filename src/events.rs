//! Host event bus
//!
//! A small single-threaded publish/subscribe hub. Plugins receive a clone of
//! the bus through the host context and use it to talk to each other (the
//! calendar listens for day-phase changes published by the daytime cycle).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use crate::plugin::error::PluginResult;
use crate::plugin::guard::guarded;

/// Phases of the in-game day, in cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPhase {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DayPhase {
    pub const ALL: [DayPhase; 4] = [
        DayPhase::Morning,
        DayPhase::Afternoon,
        DayPhase::Evening,
        DayPhase::Night,
    ];

    /// The phase that follows this one, wrapping Night back to Morning
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for DayPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayPhase::Morning => "Morning",
            DayPhase::Afternoon => "Afternoon",
            DayPhase::Evening => "Evening",
            DayPhase::Night => "Night",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for DayPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayPhase::ALL
            .iter()
            .copied()
            .find(|phase| phase.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown day phase: {}", s))
    }
}

/// Events flowing through the host
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The host is asked to stop
    Quit,
    /// A key was pressed, by key name
    KeyPressed(String),
    /// A UI button was clicked, by button id
    ButtonClicked(String),
    /// The daytime cycle moved to a new phase
    DaytimeChanged(DayPhase),
    /// Anything else a plugin wants to broadcast
    Custom { name: String, payload: serde_json::Value },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Quit => EventKind::Quit,
            Event::KeyPressed(_) => EventKind::KeyPressed,
            Event::ButtonClicked(_) => EventKind::ButtonClicked,
            Event::DaytimeChanged(_) => EventKind::DaytimeChanged,
            Event::Custom { .. } => EventKind::Custom,
        }
    }
}

/// Subscription key for [`EventBus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Quit,
    KeyPressed,
    ButtonClicked,
    DaytimeChanged,
    Custom,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<RefCell<dyn FnMut(&Event) -> PluginResult<()>>>;

/// Single-threaded publish/subscribe hub
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
    next_id: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for every event of `kind`
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> PluginResult<()> + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        debug!("Registering subscription {:?} for event: {:?}", id, kind);

        let handler: Handler = Rc::new(RefCell::new(handler));
        self.listeners.borrow_mut().entry(kind).or_default().push((id, handler));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        for (kind, handlers) in listeners.iter_mut() {
            if let Some(pos) = handlers.iter().position(|(sub, _)| *sub == id) {
                handlers.remove(pos);
                debug!("Unregistered subscription {:?} for event: {:?}", id, kind);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to every subscriber of its kind.
    ///
    /// Handlers run against a snapshot of the subscriber list, so a handler
    /// may subscribe or unsubscribe without disturbing this delivery. A failing
    /// or panicking handler is logged and the remaining handlers still run.
    /// Returns the number of handlers that completed successfully.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();
        debug!("Dispatching event: {:?}", event);

        let snapshot: Vec<(SubscriptionId, Handler)> = self
            .listeners
            .borrow()
            .get(&kind)
            .map(|handlers| handlers.clone())
            .unwrap_or_default();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            let Ok(mut callback) = handler.try_borrow_mut() else {
                warn!("Skipping re-entrant delivery of {:?} to subscription {:?}", kind, id);
                continue;
            };
            match guarded("event handler", || (&mut *callback)(event)) {
                Ok(()) => delivered += 1,
                Err(e) => error!("Error in subscription {:?} for event {:?}: {}", id, kind, e),
            }
        }
        delivered
    }

    /// Number of live subscriptions for `kind`
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.listeners.borrow().get(&kind).map(Vec::len).unwrap_or(0)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let counts: HashMap<&EventKind, usize> =
            listeners.iter().map(|(kind, handlers)| (kind, handlers.len())).collect();
        f.debug_struct("EventBus").field("listeners", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::error::PluginError;

    #[test]
    fn test_day_phase_cycle() {
        assert_eq!(DayPhase::Morning.next(), DayPhase::Afternoon);
        assert_eq!(DayPhase::Night.next(), DayPhase::Morning);
        assert_eq!("evening".parse::<DayPhase>().unwrap(), DayPhase::Evening);
        assert!("Dusk".parse::<DayPhase>().is_err());
    }

    #[test]
    fn test_publish_reaches_matching_subscribers_only() {
        let bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe(EventKind::DaytimeChanged, move |event| {
            sink.borrow_mut().push(event.clone());
            Ok(())
        });

        assert_eq!(bus.publish(&Event::ButtonClicked("play".into())), 0);
        assert_eq!(bus.publish(&Event::DaytimeChanged(DayPhase::Night)), 1);
        assert_eq!(*seen.borrow(), vec![Event::DaytimeChanged(DayPhase::Night)]);
    }

    #[test]
    fn test_failing_handler_does_not_stop_delivery() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));

        bus.subscribe(EventKind::Quit, |_| Err(PluginError::generic("nope")));
        bus.subscribe(EventKind::Quit, |_| panic!("handler exploded"));
        let counter = hits.clone();
        bus.subscribe(EventKind::Quit, move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        assert_eq!(bus.publish(&Event::Quit), 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventKind::KeyPressed, |_| Ok(()));
        assert_eq!(bus.subscriber_count(EventKind::KeyPressed), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(EventKind::KeyPressed), 0);
        assert_eq!(bus.publish(&Event::KeyPressed("d".into())), 0);
    }

    #[test]
    fn test_handler_may_publish_other_events() {
        let bus = Rc::new(EventBus::new());
        let phases = Rc::new(RefCell::new(Vec::new()));

        let sink = phases.clone();
        bus.subscribe(EventKind::DaytimeChanged, move |event| {
            if let Event::DaytimeChanged(phase) = event {
                sink.borrow_mut().push(*phase);
            }
            Ok(())
        });

        let inner = bus.clone();
        bus.subscribe(EventKind::KeyPressed, move |_| {
            inner.publish(&Event::DaytimeChanged(DayPhase::Evening));
            Ok(())
        });

        assert_eq!(bus.publish(&Event::KeyPressed("n".into())), 1);
        assert_eq!(*phases.borrow(), vec![DayPhase::Evening]);
    }
}
