//! Session change subscriptions
//!
//! Each subscriber owns an unbounded queue, so a slow consumer never drops or
//! reorders events. Dropping the [`SessionSubscription`] unsubscribes; the
//! broadcaster prunes closed queues on the next emit.

use std::sync::Mutex;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::entity::session_change::SessionChange;

/// Receiving end handed out by a session store
#[derive(Debug)]
pub struct SessionSubscription {
    rx: UnboundedReceiver<SessionChange>,
}

impl SessionSubscription {
    pub fn new(rx: UnboundedReceiver<SessionChange>) -> Self {
        Self { rx }
    }

    /// Next change, or `None` once the store is gone
    pub async fn next(&mut self) -> Option<SessionChange> {
        self.rx.recv().await
    }

    /// Buffered change without waiting
    pub fn try_next(&mut self) -> Option<SessionChange> {
        self.rx.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

/// Fan-out of session changes to every live subscriber
#[derive(Debug, Default)]
pub struct SessionBroadcaster {
    subscribers: Mutex<Vec<UnboundedSender<SessionChange>>>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> SessionSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(tx),
            Err(poisoned) => poisoned.into_inner().push(tx),
        }
        SessionSubscription::new(rx)
    }

    pub fn emit(&self, change: SessionChange) {
        tracing::debug!(event = %change.event, "Emitting session change");
        let mut subs = match self.subscribers.lock() {
            Ok(subs) => subs,
            Err(poisoned) => poisoned.into_inner(),
        };
        subs.retain(|tx| tx.send(change.clone()).is_ok());
    }

    /// Number of subscribers still listening (after the last emit)
    pub fn subscriber_count(&self) -> usize {
        let mut subs = match self.subscribers.lock() {
            Ok(subs) => subs,
            Err(poisoned) => poisoned.into_inner(),
        };
        subs.retain(|tx| !tx.is_closed());
        subs.len()
    }
}
