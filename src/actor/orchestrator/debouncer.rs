//! Leading-edge, fixed-delay debounce.
//!
//! The first event of a burst is kept as the trigger; everything that
//! arrives during the delay is discarded.

use std::time::Duration;

use crate::core::{ChangeEvent, EventReceiver, ShutdownSignal};
use crate::debug;

/// What woke the loop while it was idle.
#[derive(Debug, PartialEq, Eq)]
pub enum Wake {
    Trigger(ChangeEvent),
    Shutdown,
    /// Every sender is gone (watcher stopped).
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay: Duration,
}

impl Debouncer {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Block until the first event of a new window arrives.
    pub async fn wait(&self, events: &mut EventReceiver, shutdown: &mut ShutdownSignal) -> Wake {
        tokio::select! {
            biased;
            () = shutdown.requested() => Wake::Shutdown,
            event = events.recv() => match event {
                Some(event) => Wake::Trigger(event),
                None => Wake::Closed,
            },
        }
    }

    /// Sleep out the window, then discard whatever queued up behind the
    /// trigger. Returns the number of discarded events.
    pub async fn settle(&self, events: &mut EventReceiver) -> usize {
        tokio::time::sleep(self.delay).await;
        let drained = events.drain();
        if drained > 0 {
            debug!("main"; "collapsed {} events into one build", drained);
        }
        drained
    }
}
