//! Event subscribers for the turn controller.
//!
//! The [`EventBus`] holds any number of subscribers per [`EventKind`] plus
//! catch-all subscribers. Subscribers only see events; they never get mutable
//! access to the game state, so attaching or detaching one cannot change the
//! course of a game.
//!
//! # Architecture
//!
//! ```text
//! TurnController ──publish──► EventBus
//!                               │
//!                               ├── ConsoleObserver (log output)
//!                               ├── EventLogObserver (JSONL file/stdout)
//!                               └── FnObserver (closures, tests, UI glue)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut bus = EventBus::new();
//! bus.subscribe_all(Box::new(ConsoleObserver::new()));
//! bus.subscribe(EventKind::VictoryAchieved, Box::new(FnObserver::new("ui", |e| show(e))));
//! ```

pub mod console;
pub mod event_log;

use crate::events::{EventKind, GameEvent};
use thiserror::Error;

/// Errors that can occur while handling an event.
#[derive(Error, Debug)]
pub enum ObserverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Shared state behind a lock was poisoned.
    #[error("Observer state poisoned: {0}")]
    Poisoned(String),
}

/// Receives published events.
///
/// Errors returned from `on_event` are logged by the bus and never reach the
/// simulation.
pub trait GameObserver: Send + Sync {
    fn on_event(&self, event: &GameEvent) -> Result<(), ObserverError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Called when the subscriber is removed or the bus shuts down.
    fn on_shutdown(&self) {}
}

/// Adapter turning a closure into a [`GameObserver`].
pub struct FnObserver<F> {
    name: String,
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&GameEvent) + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> GameObserver for FnObserver<F>
where
    F: Fn(&GameEvent) + Send + Sync,
{
    fn on_event(&self, event: &GameEvent) -> Result<(), ObserverError> {
        (self.f)(event);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// `None` receives every event.
    kind: Option<EventKind>,
    observer: Box<dyn GameObserver>,
}

/// Multi-subscriber event dispatcher.
///
/// Subscribers are notified in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive only events of `kind`.
    pub fn subscribe(&mut self, kind: EventKind, observer: Box<dyn GameObserver>) -> SubscriptionId {
        self.insert(Some(kind), observer)
    }

    /// Receive every event.
    pub fn subscribe_all(&mut self, observer: Box<dyn GameObserver>) -> SubscriptionId {
        self.insert(None, observer)
    }

    fn insert(&mut self, kind: Option<EventKind>, observer: Box<dyn GameObserver>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        log::debug!("Subscribed observer '{}' to {:?}", observer.name(), kind);
        self.subscriptions.push(Subscription { id, kind, observer });
        id
    }

    /// Remove a subscriber, calling its shutdown hook. Returns false for an
    /// unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscriptions.iter().position(|s| s.id == id) {
            Some(pos) => {
                let sub = self.subscriptions.remove(pos);
                sub.observer.on_shutdown();
                true
            }
            None => false,
        }
    }

    pub fn publish(&self, event: &GameEvent) {
        let kind = event.kind();
        for sub in &self.subscriptions {
            if sub.kind.is_some_and(|k| k != kind) {
                continue;
            }
            if let Err(e) = sub.observer.on_event(event) {
                log::warn!("Observer '{}' error: {}", sub.observer.name(), e);
            }
        }
    }

    /// Shut down and drop every subscriber.
    pub fn shutdown(&mut self) {
        for sub in self.subscriptions.drain(..) {
            sub.observer.on_shutdown();
        }
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        // Flush file-backed subscribers
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedCounter(Arc<AtomicU64>);

    impl SharedCounter {
        fn get(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }

        fn increment(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct CountingObserver {
        events: SharedCounter,
        shutdowns: SharedCounter,
    }

    impl GameObserver for CountingObserver {
        fn on_event(&self, _event: &GameEvent) -> Result<(), ObserverError> {
            self.events.increment();
            Ok(())
        }

        fn name(&self) -> &str {
            "counter"
        }

        fn on_shutdown(&self) {
            self.shutdowns.increment();
        }
    }

    struct FailingObserver;

    impl GameObserver for FailingObserver {
        fn on_event(&self, _event: &GameEvent) -> Result<(), ObserverError> {
            Err(ObserverError::Poisoned("always".into()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn counter(events: &SharedCounter, shutdowns: &SharedCounter) -> Box<CountingObserver> {
        Box::new(CountingObserver {
            events: events.clone(),
            shutdowns: shutdowns.clone(),
        })
    }

    #[test]
    fn test_kind_filter() {
        let all = SharedCounter::default();
        let turns = SharedCounter::default();
        let shutdowns = SharedCounter::default();

        let mut bus = EventBus::new();
        bus.subscribe_all(counter(&all, &shutdowns));
        bus.subscribe(EventKind::TurnStarted, counter(&turns, &shutdowns));

        bus.publish(&GameEvent::TurnStarted { turn: 1 });
        bus.publish(&GameEvent::TurnEnded { turn: 1 });

        assert_eq!(all.get(), 2);
        assert_eq!(turns.get(), 1);
    }

    #[test]
    fn test_multiple_subscribers_same_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["first", "second"] {
            let seen = seen.clone();
            bus.subscribe(
                EventKind::TurnEnded,
                Box::new(FnObserver::new(name, move |e: &GameEvent| {
                    seen.lock().unwrap().push((name, e.turn()));
                })),
            );
        }

        bus.publish(&GameEvent::TurnEnded { turn: 7 });

        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe_calls_shutdown() {
        let events = SharedCounter::default();
        let shutdowns = SharedCounter::default();
        let mut bus = EventBus::new();
        let id = bus.subscribe_all(counter(&events, &shutdowns));

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(shutdowns.get(), 1);

        bus.publish(&GameEvent::TurnStarted { turn: 2 });
        assert_eq!(events.get(), 0);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_failing_observer_does_not_block_others() {
        let events = SharedCounter::default();
        let shutdowns = SharedCounter::default();
        let mut bus = EventBus::new();
        bus.subscribe_all(Box::new(FailingObserver));
        bus.subscribe_all(counter(&events, &shutdowns));

        bus.publish(&GameEvent::TurnStarted { turn: 1 });

        assert_eq!(events.get(), 1);
    }

    #[test]
    fn test_drop_shuts_down() {
        let events = SharedCounter::default();
        let shutdowns = SharedCounter::default();
        {
            let mut bus = EventBus::new();
            bus.subscribe_all(counter(&events, &shutdowns));
            bus.subscribe(EventKind::AiBuilding, counter(&events, &shutdowns));
            assert_eq!(bus.len(), 2);
        }
        assert_eq!(shutdowns.get(), 2);
    }
}
