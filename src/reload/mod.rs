//! Reload Module
//!
//! Browser live reload over the LiveReload protocol.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator --reload(event)--> ReloadNotifier --try_send--> WsActor --> Browser
//!                                                                 ^
//! acceptor thread --AddClient------------------------------------+
//!      └── GET /livereload.js (served directly)
//! ```
//!
//! # Modules
//!
//! - `message` - LiveReload message types (hello, reload, alert, info)
//! - `notifier` - Event to reload target mapping, non-blocking enqueue
//! - `server` - TCP acceptor: client script and WebSocket connections

pub mod message;
pub mod notifier;
pub mod server;

pub use notifier::{ReloadNotifier, ReloadTarget};

use crate::core::ChangeEvent;

/// Browser notification seam of the orchestrator.
pub trait Reload {
    /// Reload browsers for the cycle triggered by `trigger`.
    fn reload(&self, trigger: &ChangeEvent);

    /// Show `message` in browsers.
    fn alert(&self, message: &str);
}
