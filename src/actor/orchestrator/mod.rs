//! Orchestrator - the build/restart state machine.
//!
//! ```text
//!        event            delay + drain          Success
//! Idle ─────────▶ Debouncing ─────────▶ Building ─────────▶ Supervising ─┐
//!  ▲                                        │                            │
//!  │                                        │ Failure                    │
//!  │                                        ▼                            │
//!  └──────────────────────────────────── FailedHeld ◀────────────────────┘
//! ```
//!
//! The loop is the only owner of supervision state and of the failure log.
//! A build failure before anything was ever started ends the loop with
//! [`OrchestratorError::InitialBuildFailed`]; later failures leave the
//! running instance alone.

mod debouncer;


pub use debouncer::{Debouncer, Wake};

use std::time::Duration;

use thiserror::Error;

use crate::config::RunnerConfig;
use crate::core::{
    ChangeEvent, EventReceiver, ShutdownSignal, StopHandle, StopOutcome, stop_signal,
};
use crate::logger::{status_error, status_success, status_warning};
use crate::reload::Reload;
use crate::runner::{BuildResult, Builder, FailureLog, Launcher};
use crate::utils::exec::strip_ansi;
use crate::{debug, log};

/// Fatal outcomes of the loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("initial build failed")]
    InitialBuildFailed { diagnostic: String },

    #[error("failed to start app: {0}")]
    InitialStartFailed(String),
}

/// Where the loop currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Idle,
    Debouncing { trigger: ChangeEvent },
    Building { trigger: ChangeEvent },
    Supervising { trigger: ChangeEvent },
    FailedHeld { diagnostic: String },
    Stopped,
}

/// Running-instance bookkeeping.
#[derive(Debug, Default)]
struct Supervision {
    /// An instance has been started at least once.
    started: bool,
    /// Stop handle of the current instance.
    handle: Option<StopHandle>,
}

pub struct Orchestrator<B, L, R> {
    builder: B,
    launcher: L,
    reload: R,
    events: EventReceiver,
    shutdown: ShutdownSignal,
    debouncer: Debouncer,
    failure_log: FailureLog,
    stop_timeout: Duration,
    supervision: Supervision,
    state: State,
}

impl<B, L, R> Orchestrator<B, L, R>
where
    B: Builder,
    L: Launcher,
    R: Reload,
{
    pub fn new(
        config: &RunnerConfig,
        builder: B,
        launcher: L,
        reload: R,
        events: EventReceiver,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            builder,
            launcher,
            reload,
            events,
            shutdown,
            debouncer: Debouncer::new(config.build.delay()),
            failure_log: FailureLog::new(&config.build.failure_log),
            stop_timeout: config.run.stop_timeout(),
            supervision: Supervision::default(),
            state: State::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &State {
        &self.state
    }

    /// Run until shutdown, watcher loss, or a fatal first failure.
    ///
    /// The first cycle is triggered by [`ChangeEvent::root`], so the app is
    /// built and started without waiting for a file change.
    pub async fn run(mut self) -> Result<(), OrchestratorError> {
        debug!("main"; "debounce delay {}ms", self.debouncer.delay().as_millis());
        self.state = State::Debouncing {
            trigger: ChangeEvent::root(),
        };

        let result = loop {
            match self.step().await {
                Ok(()) if self.state == State::Stopped => break Ok(()),
                Ok(()) => {}
                Err(e) => break Err(e),
            }
        };

        self.stop_running().await;
        result
    }

    /// Perform one transition.
    pub(crate) async fn step(&mut self) -> Result<(), OrchestratorError> {
        let state = std::mem::replace(&mut self.state, State::Stopped);

        self.state = match state {
            State::Idle => match self.debouncer.wait(&mut self.events, &mut self.shutdown).await {
                Wake::Trigger(trigger) => {
                    debug!("main"; "trigger {}", trigger);
                    State::Debouncing { trigger }
                }
                Wake::Shutdown => {
                    log!("main"; "shutting down");
                    State::Stopped
                }
                Wake::Closed => {
                    log!("watch"; "watcher stopped, shutting down");
                    State::Stopped
                }
            },
            State::Debouncing { trigger } => {
                self.debouncer.settle(&mut self.events).await;
                State::Building { trigger }
            }
            State::Building { trigger } => {
                self.remove_failure_log();
                let result = self.builder.build().await;
                // Leaves the loop in `Stopped`
                if self.shutdown.is_requested() {
                    debug!("main"; "shutdown requested during build, not restarting");
                    return Ok(());
                }
                match result {
                    BuildResult::Success => State::Supervising { trigger },
                    BuildResult::Failure(diagnostic) => State::FailedHeld { diagnostic },
                }
            }
            State::Supervising { trigger } => {
                self.handoff(&trigger).await?;
                State::Idle
            }
            State::FailedHeld { diagnostic } => {
                self.hold_failure(diagnostic)?;
                State::Idle
            }
            State::Stopped => State::Stopped,
        };

        Ok(())
    }

    /// Stop the old instance, start the new one, reload browsers.
    async fn handoff(&mut self, trigger: &ChangeEvent) -> Result<(), OrchestratorError> {
        self.remove_failure_log();

        if let Some(handle) = self.supervision.handle.take() {
            self.stop_instance(handle).await;
        }

        let (handle, token) = stop_signal();
        if let Err(e) = self.launcher.run(token) {
            let text = format!("{e:#}");
            self.record_failure(&text);
            status_error("app failed to start", &text);
            if !self.supervision.started {
                return Err(OrchestratorError::InitialStartFailed(text));
            }
            self.reload.alert(&format!("app failed to start\n{}", strip_ansi(&text)));
            return Ok(());
        }

        self.supervision.handle = Some(handle);
        self.reload.reload(trigger);

        if self.supervision.started {
            status_success(&format!("restarted after {trigger}"));
        } else {
            status_success("app started");
        }
        self.supervision.started = true;
        Ok(())
    }

    /// Record a failed build. Fatal when nothing was ever started.
    fn hold_failure(&mut self, diagnostic: String) -> Result<(), OrchestratorError> {
        self.remove_failure_log();
        self.record_failure(&diagnostic);
        status_error("build failed", &diagnostic);

        if !self.supervision.started {
            return Err(OrchestratorError::InitialBuildFailed { diagnostic });
        }

        if self.supervision.handle.is_some() {
            status_warning("previous instance still running");
        }
        self.reload.alert(&format!("build failed\n{}", strip_ansi(&diagnostic)));
        Ok(())
    }

    async fn stop_instance(&mut self, handle: StopHandle) {
        match handle.stop(self.stop_timeout).await {
            Ok(StopOutcome::Acknowledged) => debug!("runner"; "previous instance stopped"),
            Ok(StopOutcome::AlreadyExited) => debug!("runner"; "previous instance had already exited"),
            Err(e) => {
                log!("error"; "{}", e);
                self.launcher.force_stop().await;
            }
        }
    }

    /// Stop whatever is running before the loop returns.
    async fn stop_running(&mut self) {
        if let Some(handle) = self.supervision.handle.take() {
            log!("runner"; "stopping app");
            self.stop_instance(handle).await;
        }
    }

    fn remove_failure_log(&self) {
        if let Err(e) = self.failure_log.remove() {
            log!("error"; "failed to remove {}: {}", self.failure_log.path().display(), e);
        }
    }

    fn record_failure(&self, text: &str) {
        if let Err(e) = self.failure_log.create(text) {
            log!("error"; "failed to write {}: {}", self.failure_log.path().display(), e);
        }
    }
}
