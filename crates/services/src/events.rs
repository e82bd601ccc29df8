//! `progress-updated` notifications for views that show progress.
//!
//! Each view holds its own `broadcast::Receiver`; dropping it unsubscribes.

use tokio::sync::broadcast;

use quest_core::model::Username;

/// Buffered events per receiver before a slow view is told it lagged.
const CHANNEL_CAPACITY: usize = 32;

/// Sent after a progress record was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdated {
    pub username: Username,
}

/// Sending half of the `progress-updated` channel.
#[derive(Debug, Clone)]
pub struct ProgressEvents {
    tx: broadcast::Sender<ProgressUpdated>,
}

impl Default for ProgressEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// A receiver that sees every event sent after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressUpdated> {
        self.tx.subscribe()
    }

    /// Best-effort delivery to the receivers alive right now.
    ///
    /// Returns how many receivers the event was queued for.
    pub fn emit(&self, event: ProgressUpdated) -> usize {
        // no receivers is not an error
        self.tx.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
