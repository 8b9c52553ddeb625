//! ctxwatch core.
//!
//! Watches the save notifications of a persistence stack and reports which
//! of the inserted, updated and deleted objects match a registered
//! interest.
//!
//! - [`object`] - Persisted objects and the sets a save reports them in
//! - [`entity`] - Entity type descriptors
//! - [`store`] - Persistence coordinator and session handles
//! - [`predicate`] - Composable predicates over objects
//! - [`notify`] - Notification center trait and the in-process event bus
//! - [`config`] - Bus and watch configuration
//! - [`watcher`] - The change watcher, its delegate and impacts
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ctxwatch_core::{
//!     ChangeWatcher, Coordinator, EntityDescriptor, EventBus, Impact, ManagedObject,
//!     ObjectSet, Predicate, SaveEvent, Session, WatcherDelegate,
//! };
//! use ctxwatch_core::ctxwatch_model::ObjectId;
//!
//! struct Printer;
//!
//! impl WatcherDelegate for Printer {
//!     fn on_change_detected(&self, impact: &Impact) {
//!         println!("{} objects changed", impact.total_objects());
//!     }
//! }
//!
//! let coordinator = Coordinator::new("main");
//! let session = Arc::new(Session::new(&coordinator));
//! let bus = Arc::new(EventBus::new());
//!
//! let watcher = ChangeWatcher::new(&session, bus.clone()).unwrap();
//! watcher.register(&EntityDescriptor::new("Post"), Predicate::parse("views > 100").unwrap());
//!
//! let printer = Arc::new(Printer);
//! watcher.set_delegate(&printer);
//!
//! let post = ManagedObject::new("Post", ObjectId::from_u64(1)).with_field("views", 250i64);
//! let event = SaveEvent::new(session).with_inserted(ObjectSet::from_iter([post]));
//! bus.publish(&event.into());
//!
//! assert_eq!(watcher.stats().impacts_delivered, 1);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod notify;
pub mod object;
pub mod predicate;
pub mod store;
pub mod watcher;

pub use config::{BusConfig, WatchConfig, WatchSpec};
pub use entity::EntityDescriptor;
pub use error::Error;
pub use notify::{
    EventBus, Handler, Notification, NotificationCenter, NotificationKind, SaveEvent,
    SubscriptionEntry, SubscriptionId,
};
pub use object::{ManagedObject, ObjectSet};
pub use predicate::{FilterEvaluator, Predicate};
pub use store::{Coordinator, Session};
pub use watcher::{ChangeWatcher, Impact, WatcherDelegate, WatcherStats};

#[cfg(feature = "async")]
pub use watcher::ChannelDelegate;

// Re-export the model and language crates for convenience
pub use ctxwatch_lang;
pub use ctxwatch_model;
