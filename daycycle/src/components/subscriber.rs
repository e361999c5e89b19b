//! Defines subscribers that react to clock events, and the registry that
//! owns them.

use crate::clock::ClockView;
use crate::common::SubscriberId;
use crate::events::ClockEvent;
use slotmap::SlotMap;

/// A callback invoked with the event and a read-only view of the clock.
pub type ClockCallback = Box<dyn FnMut(&ClockEvent, &ClockView<'_>) + Send + Sync>;

/// Which events a subscriber wants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hook {
    DayStart,
    SeasonChange,
    /// Only the start of the named period.
    PeriodStart(String),
    /// Every clock event.
    Any,
}

impl Hook {
    pub fn matches(&self, event: &ClockEvent) -> bool {
        match (self, event) {
            (Hook::Any, _) => true,
            (Hook::DayStart, ClockEvent::DayStarted { .. }) => true,
            (Hook::SeasonChange, ClockEvent::SeasonChanged { .. }) => true,
            (Hook::PeriodStart(name), ClockEvent::PeriodStarted { period, .. }) => name == period,
            _ => false,
        }
    }
}

pub(crate) struct Subscriber {
    hook: Hook,
    callback: ClockCallback,
}

impl Subscriber {
    pub(crate) fn new(hook: Hook, callback: ClockCallback) -> Self {
        Self { hook, callback }
    }

    /// Runs the callback if the event matches this subscriber's hook.
    /// Returns `true` if the callback ran.
    pub(crate) fn notify(&mut self, event: &ClockEvent, view: &ClockView<'_>) -> bool {
        if self.hook.matches(event) {
            (self.callback)(event, view);
            true
        } else {
            false
        }
    }
}

/// The observer list a clock notifies.
///
/// Delivery order among subscribers is whatever the slot map iterates in and
/// must not be relied upon.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    subscribers: SlotMap<SubscriberId, Subscriber>,
}

impl SubscriberRegistry {
    pub(crate) fn insert(&mut self, hook: Hook, callback: ClockCallback) -> SubscriberId {
        self.subscribers.insert(Subscriber::new(hook, callback))
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers `event` to every matching subscriber and returns how many ran.
    pub(crate) fn dispatch(&mut self, event: &ClockEvent, view: &ClockView<'_>) -> usize {
        self.subscribers
            .values_mut()
            .map(|subscriber| subscriber.notify(event, view))
            .filter(|ran| *ran)
            .count()
    }
}
