//! Delegate that forwards impacts to an async consumer.

use tokio::sync::mpsc;

use super::{Impact, WatcherDelegate};

/// A [`WatcherDelegate`] that sends each impact over an unbounded tokio
/// channel.
///
/// Delivery never blocks the saving thread. Impacts sent after the receiver
/// is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelDelegate {
    tx: mpsc::UnboundedSender<Impact>,
}

impl ChannelDelegate {
    /// Create a delegate and the receiver it feeds.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Impact>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Whether the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl WatcherDelegate for ChannelDelegate {
    fn on_change_detected(&self, impact: &Impact) {
        if self.tx.send(impact.clone()).is_err() {
            tracing::trace!("impact receiver dropped, discarding impact");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_impacts() {
        let (delegate, mut rx) = ChannelDelegate::new();
        delegate.on_change_detected(&Impact::default());

        let impact = rx.recv().await.unwrap();
        assert!(impact.is_empty());
    }

    #[tokio::test]
    async fn test_closed_receiver() {
        let (delegate, rx) = ChannelDelegate::new();
        drop(rx);

        assert!(delegate.is_closed());
        delegate.on_change_detected(&Impact::default());
    }
}
