//! Stop handoff between the orchestrator and an instance supervisor.
//!
//! A fresh pair is created for every started instance. The orchestrator keeps
//! the [`StopHandle`], the supervisor owns the [`StopToken`]:
//!
//! ```text
//! orchestrator                    supervisor
//!     │ stop(timeout) ──request──▶ requested()
//!     │                            terminate child
//!     │ ◀────────ack──────────── acknowledge()
//!     ▼ start replacement
//! ```
//!
//! Both halves are single use.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::oneshot;

/// Create a linked handle/token pair.
pub fn stop_signal() -> (StopHandle, StopToken) {
    let (stop_tx, stop_rx) = oneshot::channel();
    let (ack_tx, ack_rx) = oneshot::channel();
    (
        StopHandle { stop_tx, ack_rx },
        StopToken { stop_rx, ack_tx },
    )
}

/// How a stop request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The supervisor terminated the instance and confirmed.
    Acknowledged,
    /// The instance had already exited on its own; nothing to stop.
    AlreadyExited,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StopError {
    #[error("no stop acknowledgement within {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// Orchestrator half.
#[derive(Debug)]
pub struct StopHandle {
    stop_tx: oneshot::Sender<()>,
    ack_rx: oneshot::Receiver<()>,
}

impl StopHandle {
    /// Ask the supervisor to stop and wait up to `timeout` for its answer.
    pub async fn stop(self, timeout: Duration) -> Result<StopOutcome, StopError> {
        if self.stop_tx.send(()).is_err() {
            return Ok(StopOutcome::AlreadyExited);
        }

        match tokio::time::timeout(timeout, self.ack_rx).await {
            Ok(Ok(())) => Ok(StopOutcome::Acknowledged),
            // Supervisor went away between request and ack
            Ok(Err(_)) => Ok(StopOutcome::AlreadyExited),
            Err(_) => Err(StopError::Timeout(timeout)),
        }
    }

    /// Whether the supervisor has already finished.
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.stop_tx.is_closed()
    }
}

/// Supervisor half.
#[derive(Debug)]
pub struct StopToken {
    stop_rx: oneshot::Receiver<()>,
    ack_tx: oneshot::Sender<()>,
}

impl StopToken {
    /// Resolve when a stop is requested.
    ///
    /// A dropped handle counts as a request: nobody is left to supervise for.
    pub async fn requested(&mut self) {
        let _ = (&mut self.stop_rx).await;
    }

    /// Tell the orchestrator the instance is gone.
    pub fn acknowledge(self) {
        let _ = self.ack_tx.send(());
    }
}
