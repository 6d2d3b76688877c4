//! Build and run collaborators of the orchestrator.
//!
//! | Module    | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `build`   | `CommandBuilder`: runs `build.command`           |
//! | `process` | `ProcessLauncher`: starts and supervises the app |
//! | `failure` | `FailureLog`: last build failure on disk         |
//! | `env`     | `DEV_RUNNER` / `$RUNNER_*` variables             |
//!
//! The orchestrator only sees the [`Builder`] and [`Launcher`] traits, so
//! its tests drive it with in-memory fakes.

mod build;
mod env;
mod failure;
mod process;

pub use build::CommandBuilder;
pub use failure::FailureLog;
pub use process::ProcessLauncher;

#[cfg(test)]
pub use env::runner_vars;

use std::future::Future;

use anyhow::Result;

use crate::core::StopToken;

/// Outcome of one build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    Success,
    /// Diagnostic text shown to the user and written to the failure log.
    Failure(String),
}

/// Produces a new artifact.
pub trait Builder {
    fn build(&mut self) -> impl Future<Output = BuildResult>;
}

/// Starts application instances.
pub trait Launcher {
    /// Start a new instance supervised with `token`.
    ///
    /// Only called once the previous instance has stopped.
    fn run(&mut self, token: StopToken) -> Result<()>;

    /// Kill the current instance without waiting for it to acknowledge.
    ///
    /// Resolves once the instance is gone.
    fn force_stop(&mut self) -> impl Future<Output = ()>;
}
