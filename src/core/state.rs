//! Shutdown state.
//!
//! The Ctrl+C handler only flips a flag and notifies the orchestrator; the
//! loop itself decides when it is safe to stop the running app and return.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Exit status used when a second Ctrl+C forces an immediate exit.
const FORCED_EXIT_CODE: i32 = 130;

/// Sending half, held by the signal handler.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }
}

/// Receiving half, held by the orchestrator loop.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is requested. Never resolves if the trigger is
    /// dropped without firing.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Create a linked trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - First press: request graceful shutdown (running app is stopped first)
/// - Second press: exit immediately
pub fn setup_shutdown_handler() -> anyhow::Result<ShutdownSignal> {
    let (trigger, signal) = shutdown_channel();

    ctrlc::set_handler(move || {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(FORCED_EXIT_CODE);
        }
        crate::log!("main"; "shutting down...");
        trigger.trigger();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))?;

    Ok(signal)
}
