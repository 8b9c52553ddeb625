//! Subscription bookkeeping.

use std::time::{Duration, Instant};

use super::{NotificationKind, SubscriptionId};

/// Tracking record for one active subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionEntry {
    /// Subscription handle.
    pub id: SubscriptionId,
    /// Kind of notification subscribed to.
    pub kind: NotificationKind,
    /// When the subscription was created.
    pub created_at: Instant,
    /// Number of notifications delivered to the handler.
    pub events_delivered: u64,
}

impl SubscriptionEntry {
    /// Create a new subscription entry.
    pub fn new(id: SubscriptionId, kind: NotificationKind) -> Self {
        Self {
            id,
            kind,
            created_at: Instant::now(),
            events_delivered: 0,
        }
    }

    /// Get the age of this subscription.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Increment the delivered counter.
    pub fn record_delivery(&mut self) {
        self.events_delivered += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_entry() {
        let mut entry = SubscriptionEntry::new(SubscriptionId::new(1), NotificationKind::StoreSaved);

        assert_eq!(entry.id, SubscriptionId::new(1));
        assert_eq!(entry.kind, NotificationKind::StoreSaved);
        assert_eq!(entry.events_delivered, 0);

        entry.record_delivery();
        entry.record_delivery();
        assert_eq!(entry.events_delivered, 2);
        assert!(entry.age() < Duration::from_secs(60));
    }
}
