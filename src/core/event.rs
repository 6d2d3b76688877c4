//! Change events and the channel carrying them from the watcher to the loop.
//!
//! ```text
//! watcher --publish (never blocks)--> EventChannel --recv / drain--> orchestrator
//! ```

use std::fmt;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Capacity of the event channel.
///
/// Large enough that a save storm never fills it in practice; if it ever
/// does, the producer reports it instead of blocking.
pub const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Separator between the changed path and its detail (`path:kind`).
pub const DETAIL_SEPARATOR: char = ':';

/// Opaque identifier of a change, e.g. `src/main.go:modified`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeEvent(String);

impl ChangeEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The seed event: "watch root changed".
    pub fn root() -> Self {
        Self::new("/")
    }

    /// Event for a path with a change detail.
    pub fn with_detail(path: &str, detail: &str) -> Self {
        Self::new(format!("{path}{DETAIL_SEPARATOR}{detail}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why an event could not be published.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("event channel full ({EVENT_CHANNEL_CAPACITY} pending), dropped `{0}`")]
    Full(ChangeEvent),
    #[error("event channel closed, dropped `{0}`")]
    Closed(ChangeEvent),
}

/// Create the bounded event channel.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer side. Cheap to clone, safe to use from any thread.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ChangeEvent>,
}

impl EventSender {
    /// Publish an event without blocking.
    pub fn publish(&self, event: ChangeEvent) -> Result<(), PublishError> {
        self.tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(event) => PublishError::Full(event),
            TrySendError::Closed(event) => PublishError::Closed(event),
        })
    }
}

/// Consumer side, owned by the orchestrator loop.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<ChangeEvent>,
}

impl EventReceiver {
    /// Wait for the next event. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Discard everything currently queued without waiting.
    ///
    /// Returns the number of discarded events.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.rx.try_recv() {
            crate::debug!("main"; "flushing event {}", event);
            drained += 1;
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_detail_format() {
        let event = ChangeEvent::with_detail("src/a.go", "modified");
        assert_eq!(event.as_str(), "src/a.go:modified");
    }

    #[tokio::test]
    async fn test_recv_then_drain_keeps_order() {
        let (tx, mut rx) = event_channel();
        for name in ["a", "b", "c"] {
            tx.publish(ChangeEvent::new(name)).unwrap();
        }

        assert_eq!(rx.recv().await, Some(ChangeEvent::new("a")));
        assert_eq!(rx.drain(), 2);
        assert_eq!(rx.drain(), 0);
    }

    #[test]
    fn test_publish_full_does_not_block() {
        let (tx, _rx) = event_channel();
        for i in 0..EVENT_CHANNEL_CAPACITY {
            tx.publish(ChangeEvent::new(i.to_string())).unwrap();
        }

        let err = tx.publish(ChangeEvent::new("overflow")).unwrap_err();
        assert_eq!(err, PublishError::Full(ChangeEvent::new("overflow")));
    }

    #[test]
    fn test_publish_closed() {
        let (tx, rx) = event_channel();
        drop(rx);

        let err = tx.publish(ChangeEvent::root()).unwrap_err();
        assert!(matches!(err, PublishError::Closed(_)));
    }

    #[tokio::test]
    async fn test_recv_none_when_senders_dropped() {
        let (tx, mut rx) = event_channel();
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }
}
