//! In-process notification bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::subscription::SubscriptionEntry;
use super::{Handler, Notification, NotificationCenter, NotificationKind, SubscriptionId};
use crate::config::BusConfig;
use crate::error::Error;

struct Subscriber {
    entry: SubscriptionEntry,
    handler: Handler,
}

/// Synchronous in-process [`NotificationCenter`].
///
/// [`publish`](EventBus::publish) runs every matching handler on the
/// caller's thread, in subscription order. Handlers are snapshotted first,
/// so a handler may subscribe or unsubscribe while a publish is running; a
/// subscription removed mid-publish is not invoked afterwards.
pub struct EventBus {
    /// Active subscriptions keyed by id.
    subscriptions: DashMap<SubscriptionId, Subscriber>,
    /// Next subscription id.
    next_subscription_id: AtomicU64,
    config: BusConfig,
}

impl EventBus {
    /// Create a bus with the default configuration.
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a bus with the given configuration.
    pub fn with_config(config: BusConfig) -> Self {
        Self {
            subscriptions: DashMap::new(),
            next_subscription_id: AtomicU64::new(1),
            config,
        }
    }

    /// The bus configuration.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Deliver `notification` to every handler subscribed to its kind.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, notification: &Notification) -> usize {
        let kind = notification.kind();

        let mut targets: Vec<(SubscriptionId, Handler)> = self
            .subscriptions
            .iter()
            .filter(|sub| sub.entry.kind == kind)
            .map(|sub| (*sub.key(), Arc::clone(&sub.handler)))
            .collect();
        targets.sort_by_key(|(id, _)| *id);

        let mut delivered = 0;
        for (id, handler) in targets {
            // No map guard may be held while the handler runs.
            if !self.subscriptions.contains_key(&id) {
                continue;
            }
            handler(notification);
            delivered += 1;

            if let Some(mut sub) = self.subscriptions.get_mut(&id) {
                sub.entry.record_delivery();
            }
            tracing::trace!(subscription_id = id.as_u64(), kind = ?kind, "notification delivered");
        }
        delivered
    }

    /// Get the number of active subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Get a subscription by id.
    pub fn get_subscription(&self, id: SubscriptionId) -> Option<SubscriptionEntry> {
        self.subscriptions.get(&id).map(|sub| sub.entry.clone())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter for EventBus {
    fn subscribe(
        &self,
        kind: NotificationKind,
        handler: Handler,
    ) -> Result<SubscriptionId, Error> {
        if let Some(limit) = self.config.max_subscriptions {
            if self.subscriptions.len() >= limit {
                return Err(Error::SubscriptionLimit { limit });
            }
        }

        let id = SubscriptionId::new(self.next_subscription_id.fetch_add(1, Ordering::SeqCst));
        self.subscriptions.insert(
            id,
            Subscriber {
                entry: SubscriptionEntry::new(id, kind),
                handler,
            },
        );

        tracing::debug!(subscription_id = id.as_u64(), kind = ?kind, "subscription created");
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), Error> {
        let (_, sub) = self
            .subscriptions
            .remove(&id)
            .ok_or(Error::SubscriptionNotFound(id))?;

        tracing::debug!(
            subscription_id = id.as_u64(),
            events_delivered = sub.entry.events_delivered,
            "subscription removed"
        );
        Ok(())
    }
}
