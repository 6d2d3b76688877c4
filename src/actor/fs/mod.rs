//! File System Watcher
//!
//! Publishes one change event per relevant path straight from notify's
//! callback thread. Coalescing is left to the orchestrator's debouncer.
//!
//! ```text
//! notify callback → ChangeFilter → EventSender::publish("path:kind")
//! ```

use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher as _};

use crate::config::RunnerConfig;
use crate::core::EventSender;
use crate::{debug, log};

// Path and kind filtering (ignored dirs, extensions, temp files).
mod filter;
// Shared fs event types.
mod types;

#[cfg(test)]
mod tests;

use filter::ChangeFilter;

/// Recursive watcher on the watch root. Stops when dropped.
pub struct Watcher {
    _watcher: RecommendedWatcher,
}

impl Watcher {
    /// Start watching `config.root`, publishing into `events`.
    pub fn start(config: Arc<RunnerConfig>, events: EventSender) -> notify::Result<Self> {
        let filter = ChangeFilter::new(&config);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    for change in filter.events(&event) {
                        debug!("watch"; "{}", change);
                        if let Err(e) = events.publish(change) {
                            log!("error"; "{}", e);
                        }
                    }
                }
                Err(e) => log!("watch"; "notify error: {}", e),
            }
        })?;

        watcher.watch(&config.root, RecursiveMode::Recursive)?;
        log!("watch"; "watching {}", config.root.display());

        Ok(Self { _watcher: watcher })
    }
}
