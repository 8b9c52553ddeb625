//! Notification plumbing between a persistence stack and its observers.
//!
//! A [`NotificationCenter`] delivers [`Notification`]s to subscribed
//! handlers. [`EventBus`] is the in-process implementation; any other
//! transport can be plugged into a watcher by implementing the trait.

mod bus;
mod event;
mod subscription;

pub use bus::EventBus;
pub use event::SaveEvent;
pub use subscription::SubscriptionEntry;

use std::fmt;
use std::sync::Arc;

use crate::error::Error;

/// Handle returned by [`NotificationCenter::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kinds of notification a handler can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A session committed a save.
    StoreSaved,
}

/// A notification with its payload.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A session committed a save.
    StoreSaved(SaveEvent),
}

impl Notification {
    /// The kind of this notification.
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::StoreSaved(_) => NotificationKind::StoreSaved,
        }
    }
}

impl From<SaveEvent> for Notification {
    fn from(event: SaveEvent) -> Self {
        Notification::StoreSaved(event)
    }
}

/// Callback invoked for each delivered notification.
pub type Handler = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Source of notifications that observers subscribe to.
///
/// Subscriptions are not scoped by sender: a handler sees every
/// notification of its kind and filters for itself.
pub trait NotificationCenter: Send + Sync {
    /// Register `handler` for notifications of `kind`.
    fn subscribe(&self, kind: NotificationKind, handler: Handler)
        -> Result<SubscriptionId, Error>;

    /// Remove a subscription. Once this returns, the handler is not invoked
    /// for notifications published afterwards.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), Error>;
}
