//! Maps trigger events to browser reloads.
//!
//! Notifications are enqueued on the WebSocket actor's channel with
//! `try_send`, so a slow or stuck transport never holds up the loop.

use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};

use super::Reload;
use crate::actor::messages::ReloadMsg;
use crate::core::{ChangeEvent, DETAIL_SEPARATOR};
use crate::debug;

/// What the browser should reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadTarget {
    /// Reload the whole page.
    Full,
    /// Reload one resource (stylesheets are swapped in place).
    Path(String),
}

impl ReloadTarget {
    /// Derive the target from a trigger event.
    ///
    /// `path:detail` targets `path` (surrounding double quotes stripped);
    /// an identifier without a detail separator, or with an empty path,
    /// reloads the whole page.
    pub fn from_event(event: &ChangeEvent) -> Self {
        let Some((path, _)) = event.as_str().split_once(DETAIL_SEPARATOR) else {
            return Self::Full;
        };

        let path = path.trim_matches('"');
        if path.is_empty() {
            Self::Full
        } else {
            Self::Path(path.to_string())
        }
    }

    /// Path sent to the client (`/` for a full reload).
    pub fn as_path(&self) -> &str {
        match self {
            Self::Full => "/",
            Self::Path(path) => path,
        }
    }
}

impl fmt::Display for ReloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full page"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

/// Sends reload and alert requests to the WebSocket actor.
#[derive(Debug, Clone)]
pub struct ReloadNotifier {
    tx: Option<mpsc::Sender<ReloadMsg>>,
}

impl ReloadNotifier {
    pub fn new(tx: mpsc::Sender<ReloadMsg>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Notifier for `reload.enable = false`: every call is a no-op.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    fn send(&self, msg: ReloadMsg) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(msg)) => {
                debug!("reload"; "queue full, dropped {:?}", msg);
            }
            Err(TrySendError::Closed(msg)) => {
                debug!("reload"; "server gone, dropped {:?}", msg);
            }
        }
    }
}

impl Reload for ReloadNotifier {
    fn reload(&self, trigger: &ChangeEvent) {
        let target = ReloadTarget::from_event(trigger);
        debug!("reload"; "reloading {}", target);
        self.send(ReloadMsg::Reload { target });
    }

    fn alert(&self, message: &str) {
        self.send(ReloadMsg::Alert {
            message: message.to_string(),
        });
    }
}
