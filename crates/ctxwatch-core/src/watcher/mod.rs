//! The change watcher.
//!
//! A [`ChangeWatcher`] is bound to one persistence [`Coordinator`]. It
//! accumulates interest clauses of the form `entity == name && predicate`,
//! OR-ed together, and subscribes to save notifications. For each save on
//! its own coordinator it filters the inserted, updated and deleted sets
//! through the accumulated interest and hands the non-empty result to its
//! delegate exactly once.
//!
//! Saves on other coordinators, saves that match nothing, and saves that
//! arrive while no delegate is alive are silent no-ops.

#[cfg(feature = "async")]
mod channel;
mod impact;

#[cfg(feature = "async")]
pub use channel::ChannelDelegate;
pub use impact::Impact;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::WatchConfig;
use crate::entity::EntityDescriptor;
use crate::error::Error;
use crate::notify::{
    Handler, Notification, NotificationCenter, NotificationKind, SaveEvent, SubscriptionId,
};
use crate::predicate::Predicate;
use crate::store::{Coordinator, Session};

/// Receiver of a watcher's impacts.
pub trait WatcherDelegate: Send + Sync {
    /// Called once per save that matched the watcher's interest.
    ///
    /// Runs synchronously on the thread that published the save.
    fn on_change_detected(&self, impact: &Impact);
}

/// Counters describing what a watcher has done with the saves it received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WatcherStats {
    /// Save notifications received.
    pub events_seen: u64,
    /// Saves discarded because they came from another coordinator.
    pub events_ignored: u64,
    /// Impacts handed to a live delegate.
    pub impacts_delivered: u64,
    /// Non-empty impacts computed while no live delegate was set.
    pub impacts_dropped: u64,
}

#[derive(Default)]
struct Interest {
    predicate: Option<Arc<Predicate>>,
    clauses: usize,
}

impl Interest {
    fn add_clause(&mut self, entity: &EntityDescriptor, predicate: Predicate) {
        assert!(entity.is_named(), "entity descriptor has no name");

        let clause = Predicate::entity(entity.name()).and(predicate);
        let next = match self.predicate.take() {
            Some(current) => Arc::try_unwrap(current)
                .unwrap_or_else(|shared| Predicate::clone(&shared))
                .or(clause),
            None => clause,
        };
        self.predicate = Some(Arc::new(next));
        self.clauses += 1;
    }
}

#[derive(Default)]
struct Counters {
    events_seen: AtomicU64,
    events_ignored: AtomicU64,
    impacts_delivered: AtomicU64,
    impacts_dropped: AtomicU64,
}

/// State shared between the watcher and its notification handler.
struct WatcherState {
    coordinator: Arc<Coordinator>,
    interest: RwLock<Interest>,
    delegate: RwLock<Option<Weak<dyn WatcherDelegate>>>,
    counters: Counters,
}

impl WatcherState {
    fn handle(&self, notification: &Notification) {
        match notification {
            Notification::StoreSaved(event) => self.handle_save(event),
        }
    }

    fn handle_save(&self, event: &SaveEvent) {
        // Clone the predicate out so closures it calls may re-enter the watcher.
        let predicate = self
            .interest
            .read()
            .predicate
            .clone()
            .unwrap_or_else(|| panic!("save notification received before any registration"));
        let source = event
            .source
            .as_ref()
            .unwrap_or_else(|| panic!("save notification carries no source session"));
        let coordinator = source.coordinator().unwrap_or_else(|| {
            panic!(
                "save notification from session {} without a persistence coordinator",
                source.id()
            )
        });

        self.counters.events_seen.fetch_add(1, Ordering::Relaxed);
        if !Coordinator::same(coordinator, &self.coordinator) {
            self.counters.events_ignored.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let impact = Impact::compute(&predicate, event);
        if impact.is_empty() {
            return;
        }

        let delegate = self.delegate.read().as_ref().and_then(Weak::upgrade);
        match delegate {
            Some(delegate) => {
                tracing::trace!(
                    coordinator = self.coordinator.id(),
                    session = source.id(),
                    kinds = impact.len(),
                    objects = impact.total_objects(),
                    "delivering impact"
                );
                delegate.on_change_detected(&impact);
                self.counters.impacts_delivered.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                self.counters.impacts_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Watches save notifications of one persistence coordinator.
///
/// Dropping the watcher unsubscribes it and releases its delegate.
pub struct ChangeWatcher {
    state: Arc<WatcherState>,
    center: Arc<dyn NotificationCenter>,
    subscription: SubscriptionId,
}

impl ChangeWatcher {
    /// Create a watcher bound to `session`'s coordinator and subscribe it
    /// to save notifications on `center`.
    ///
    /// The watcher has no interest until [`register`](Self::register) is
    /// called; a save delivered before that panics.
    ///
    /// # Panics
    ///
    /// Panics if `session` has no persistence coordinator.
    pub fn new(session: &Session, center: Arc<dyn NotificationCenter>) -> Result<Self, Error> {
        let coordinator = session
            .coordinator()
            .unwrap_or_else(|| panic!("session {} has no persistence coordinator", session.id()));

        let state = Arc::new(WatcherState {
            coordinator: Arc::clone(coordinator),
            interest: RwLock::new(Interest::default()),
            delegate: RwLock::new(None),
            counters: Counters::default(),
        });

        let weak = Arc::downgrade(&state);
        let handler: Handler = Arc::new(move |notification: &Notification| {
            if let Some(state) = weak.upgrade() {
                state.handle(notification);
            }
        });
        let subscription = center.subscribe(NotificationKind::StoreSaved, handler)?;

        tracing::debug!(
            coordinator = coordinator.id(),
            subscription_id = subscription.as_u64(),
            "change watcher created"
        );

        Ok(Self {
            state,
            center,
            subscription,
        })
    }

    /// Add interest in objects of `entity` satisfying `predicate`.
    ///
    /// Clauses accumulate; registering the same entity twice is equivalent
    /// to registering it once with the two predicates OR-ed.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has an empty name.
    pub fn register(&self, entity: &EntityDescriptor, predicate: Predicate) {
        let clauses = {
            let mut interest = self.state.interest.write();
            interest.add_clause(entity, predicate);
            interest.clauses
        };

        tracing::debug!(entity = entity.name(), clauses, "interest registered");
    }

    /// Add interest in every object of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has an empty name.
    pub fn watch_entity(&self, entity: &EntityDescriptor) {
        self.register(entity, Predicate::always());
    }

    /// Register every watch in `config`.
    ///
    /// The configuration is validated and compiled first; if it is empty or
    /// any watch is invalid, nothing is registered.
    pub fn apply_config(&self, config: &WatchConfig) -> Result<(), Error> {
        let compiled = config.compile()?;

        let count = compiled.len();
        let clauses = {
            let mut interest = self.state.interest.write();
            for (entity, predicate) in compiled {
                interest.add_clause(&entity, predicate);
            }
            interest.clauses
        };

        tracing::debug!(watches = count, clauses, "watch configuration applied");
        Ok(())
    }

    /// Set the delegate. Only a weak reference is kept.
    pub fn set_delegate<D>(&self, delegate: &Arc<D>)
    where
        D: WatcherDelegate + 'static,
    {
        let weak = Arc::downgrade(delegate);
        let weak: Weak<dyn WatcherDelegate> = weak;
        *self.state.delegate.write() = Some(weak);
    }

    /// Remove the delegate.
    pub fn clear_delegate(&self) {
        *self.state.delegate.write() = None;
    }

    /// Number of registered clauses.
    pub fn clause_count(&self) -> usize {
        self.state.interest.read().clauses
    }

    /// The accumulated interest, if anything has been registered.
    pub fn interest(&self) -> Option<Predicate> {
        self.state
            .interest
            .read()
            .predicate
            .as_deref()
            .cloned()
    }

    /// The coordinator this watcher is bound to.
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.state.coordinator
    }

    /// The watcher's notification subscription.
    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Snapshot of the watcher's counters.
    pub fn stats(&self) -> WatcherStats {
        let c = &self.state.counters;
        WatcherStats {
            events_seen: c.events_seen.load(Ordering::Relaxed),
            events_ignored: c.events_ignored.load(Ordering::Relaxed),
            impacts_delivered: c.impacts_delivered.load(Ordering::Relaxed),
            impacts_dropped: c.impacts_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.center.unsubscribe(self.subscription) {
            tracing::warn!(
                subscription_id = self.subscription.as_u64(),
                error = %e,
                "failed to unsubscribe change watcher"
            );
        }
        self.clear_delegate();
    }
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("coordinator", &self.state.coordinator.id())
            .field("subscription", &self.subscription)
            .field("clauses", &self.clause_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::EventBus;
    use crate::object::{ManagedObject, ObjectSet};
    use ctxwatch_model::ObjectId;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        impacts: Mutex<Vec<Impact>>,
    }

    impl WatcherDelegate for Recorder {
        fn on_change_detected(&self, impact: &Impact) {
            self.impacts.lock().push(impact.clone());
        }
    }

    struct Fixture {
        bus: Arc<EventBus>,
        session: Arc<Session>,
        watcher: ChangeWatcher,
    }

    fn fixture() -> Fixture {
        let coordinator = Coordinator::new("main");
        let session = Arc::new(Session::new(&coordinator));
        let bus = Arc::new(EventBus::new());
        let watcher = ChangeWatcher::new(&session, bus.clone()).unwrap();
        Fixture {
            bus,
            session,
            watcher,
        }
    }

    fn post(n: u64) -> ManagedObject {
        ManagedObject::new("Post", ObjectId::from_u64(n))
    }

    #[test]
    fn test_new_subscribes() {
        let fx = fixture();
        assert_eq!(fx.bus.subscription_count(), 1);
        assert!(fx.bus.get_subscription(fx.watcher.subscription()).is_some());
        assert_eq!(fx.watcher.clause_count(), 0);
        assert!(fx.watcher.interest().is_none());
    }

    #[test]
    #[should_panic(expected = "has no persistence coordinator")]
    fn test_new_without_coordinator_panics() {
        let bus = Arc::new(EventBus::new());
        let _ = ChangeWatcher::new(&Session::detached(), bus);
    }

    #[test]
    #[should_panic(expected = "entity descriptor has no name")]
    fn test_register_unnamed_panics() {
        let fx = fixture();
        fx.watcher.register(&EntityDescriptor::new(""), Predicate::always());
    }

    #[test]
    fn test_register_accumulates() {
        let fx = fixture();
        fx.watcher.watch_entity(&EntityDescriptor::new("Post"));
        fx.watcher.watch_entity(&EntityDescriptor::new("Post"));
        assert_eq!(fx.watcher.clause_count(), 2);
        assert!(matches!(fx.watcher.interest(), Some(Predicate::Or(parts)) if parts.len() == 2));
    }

    #[test]
    fn test_delivers_once_per_save() {
        let fx = fixture();
        let recorder = Arc::new(Recorder::default());
        fx.watcher.set_delegate(&recorder);
        fx.watcher.watch_entity(&EntityDescriptor::new("Post"));

        let event = SaveEvent::new(Arc::clone(&fx.session))
            .with_inserted(ObjectSet::from_iter([post(1), post(2)]))
            .with_updated(ObjectSet::from_iter([post(3)]));
        fx.bus.publish(&event.into());

        let impacts = recorder.impacts.lock();
        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].total_objects(), 3);
        assert_eq!(fx.watcher.stats().impacts_delivered, 1);
    }

    #[test]
    fn test_clear_delegate_drops_impacts() {
        let fx = fixture();
        let recorder = Arc::new(Recorder::default());
        fx.watcher.set_delegate(&recorder);
        fx.watcher.clear_delegate();
        fx.watcher.watch_entity(&EntityDescriptor::new("Post"));

        let event =
            SaveEvent::new(Arc::clone(&fx.session)).with_inserted(ObjectSet::from_iter([post(1)]));
        fx.bus.publish(&event.into());

        assert!(recorder.impacts.lock().is_empty());
        assert_eq!(fx.watcher.stats().impacts_dropped, 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let fx = fixture();
        let id = fx.watcher.subscription();
        drop(fx.watcher);

        assert_eq!(fx.bus.subscription_count(), 0);
        assert!(fx.bus.get_subscription(id).is_none());
    }

    #[test]
    fn test_drop_tolerates_missing_subscription() {
        let fx = fixture();
        fx.bus.unsubscribe(fx.watcher.subscription()).unwrap();
        drop(fx.watcher);
    }

    #[test]
    fn test_predicate_may_reenter_watcher() {
        let fx = fixture();
        let watcher = Arc::new(fx.watcher);
        let recorder = Arc::new(Recorder::default());
        watcher.set_delegate(&recorder);

        let inner = Arc::downgrade(&watcher);
        watcher.register(
            &EntityDescriptor::new("Post"),
            Predicate::from_fn(move |_| inner.upgrade().is_some_and(|w| w.clause_count() == 1)),
        );

        let event =
            SaveEvent::new(Arc::clone(&fx.session)).with_inserted(ObjectSet::from_iter([post(1)]));
        fx.bus.publish(&event.into());
        assert_eq!(recorder.impacts.lock().len(), 1);
    }

    #[test]
    fn test_set_delegate_keeps_weak_reference() {
        let fx = fixture();
        let recorder = Arc::new(Recorder::default());
        fx.watcher.set_delegate(&recorder);

        assert_eq!(Arc::strong_count(&recorder), 1);
        assert_eq!(Arc::weak_count(&recorder), 1);

        fx.watcher.clear_delegate();
        assert_eq!(Arc::weak_count(&recorder), 0);
    }

    #[test]
    fn test_debug_output() {
        let fx = fixture();
        let text = format!("{:?}", fx.watcher);
        assert!(text.starts_with("ChangeWatcher"));
        assert!(text.contains("clauses: 0"));
    }
}
