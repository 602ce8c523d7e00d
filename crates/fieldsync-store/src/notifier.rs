//! Write-through change notification
//!
//! Reactive queries in this store are full resnapshots: every write that
//! touches the data point tables pings subscribers, and each live query
//! re-runs itself and delivers the complete new result set. This module
//! provides the ping channel.

use tokio::sync::broadcast;

/// Broadcast capacity. A lagged subscriber just re-runs its query once on
/// the next receive, so a small buffer is enough.
const CHANNEL_CAPACITY: usize = 32;

/// Fan-out notifier for store writes
///
/// Cloned freely; all clones share the same broadcast channel. Sending with
/// no subscribers is a no-op.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<()>,
}

impl ChangeNotifier {
    /// Creates a new notifier with no subscribers
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Signals that the data point tables changed
    pub fn notify(&self) {
        // Err means no active subscribers, which is fine
        let _ = self.tx.send(());
    }

    /// Subscribes to change signals
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
