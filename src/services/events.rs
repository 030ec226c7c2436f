//! Event bus for scanner notifications
//!
//! Components that need to react to a scan (borrow dialogs, activity views)
//! subscribe here instead of listening for ambient window events.

use tokio::sync::broadcast;

use crate::models::ScanEvent;

#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ScanEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.sender.subscribe()
    }

    /// Publish to current subscribers; having none is not an error
    pub fn publish(&self, event: ScanEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Scan event dropped, no subscribers");
        }
    }
}
