//! `[run]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [run]
//! command = ["tmp/runner-build"]
//! stop_timeout = 5000     # Max wait for the old instance to stop (ms)
//! kill_grace = 2000       # SIGTERM -> SIGKILL grace period (ms)
//!
//! [run.env]
//! PORT = "8080"
//! ```
//!
//! The run command is not validated at load time: it usually points at an
//! artifact the first build has yet to produce.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Application process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Command starting the built application.
    pub command: Vec<String>,

    /// How long to wait for the old instance to acknowledge a stop (ms).
    pub stop_timeout: u64,

    /// Grace period between SIGTERM and SIGKILL (ms).
    pub kill_grace: u64,

    /// Extra environment variables for the application.
    pub env: FxHashMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            command: vec!["tmp/runner-build".to_string()],
            stop_timeout: 5000,
            kill_grace: 2000,
            env: FxHashMap::default(),
        }
    }
}

/// Headroom between the supervisor's SIGKILL and the handoff timeout.
const STOP_MARGIN_MS: u64 = 500;

impl RunConfig {
    const COMMAND: FieldPath = FieldPath::new("run.command");
    const STOP_TIMEOUT: FieldPath = FieldPath::new("run.stop_timeout");

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.is_empty() {
            diag.error(Self::COMMAND, "must not be empty");
        }

        if self.stop_timeout == 0 {
            diag.error(Self::STOP_TIMEOUT, "must be greater than 0");
        } else if self.stop_timeout < self.kill_grace.saturating_add(STOP_MARGIN_MS) {
            diag.error_with_hint(
                Self::STOP_TIMEOUT,
                format!(
                    "must exceed `run.kill_grace` by at least {STOP_MARGIN_MS}ms ({} vs {})",
                    self.stop_timeout, self.kill_grace
                ),
                "the old instance would be force-killed before its grace period ends",
            );
        }
    }
}
