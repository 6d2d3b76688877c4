//! Application process launcher and per-instance supervisor.
//!
//! Each started instance gets its own supervisor task:
//!
//! ```text
//! supervise(child, token, kill)
//!     ├── child exits on its own ──▶ log status, drop token
//!     ├── token.requested()      ──▶ SIGTERM, wait kill_grace, SIGKILL
//!     │                              └─▶ token.acknowledge()
//!     └── kill signal            ──▶ SIGKILL and reap, at any point
//! ```
//!
//! [`Launcher::force_stop`] fires the kill signal and waits for the
//! supervisor to finish, so the child has been reaped when it returns.
//! Dropping the launcher closes the kill channel, which kills the instance
//! too.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::{Launcher, env};
use crate::config::RunnerConfig;
use crate::core::StopToken;
use crate::utils::exec::Cmd;
use crate::{debug, log};

/// Runs `run.command` in the watch root.
#[derive(Debug)]
pub struct ProcessLauncher {
    command: Vec<String>,
    root: PathBuf,
    vars: FxHashMap<String, String>,
    kill_grace: Duration,
    current: Option<Instance>,
}

/// Supervisor of the latest instance.
#[derive(Debug)]
struct Instance {
    kill: oneshot::Sender<()>,
    supervisor: JoinHandle<()>,
}

impl ProcessLauncher {
    pub fn new(config: &RunnerConfig) -> Self {
        let vars = env::runner_vars(config);
        Self {
            command: env::resolve_args(&config.run.command, &vars),
            root: config.root.clone(),
            vars,
            kill_grace: config.run.kill_grace(),
            current: None,
        }
    }
}

impl Launcher for ProcessLauncher {
    fn run(&mut self, token: StopToken) -> Result<()> {
        log!("runner"; "running `{}`", self.command.join(" "));

        let mut child = Cmd::from_slice(self.command.as_slice())
            .cwd(&self.root)
            .envs(&self.vars)
            .spawn()
            .context("failed to start app")?;

        if let Some(stdout) = child.stdout.take() {
            forward_output(stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_output(stderr);
        }

        let (kill, kill_rx) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(child, token, self.kill_grace, kill_rx));
        self.current = Some(Instance { kill, supervisor });
        Ok(())
    }

    async fn force_stop(&mut self) {
        let Some(instance) = self.current.take() else {
            return;
        };

        log!("runner"; "force killing app");
        let _ = instance.kill.send(());
        if let Err(e) = instance.supervisor.await {
            debug!("runner"; "supervisor ended abnormally: {}", e);
        }
    }
}

/// Watch one instance until it exits, a stop is requested, or it is killed.
async fn supervise(
    mut child: Child,
    mut token: StopToken,
    kill_grace: Duration,
    mut kill_rx: oneshot::Receiver<()>,
) {
    tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => log!("runner"; "app exited with {}", status),
                Err(e) => log!("error"; "failed to wait for app: {}", e),
            }
            return;
        }
        () = token.requested() => {}
        _ = &mut kill_rx => {
            kill_and_reap(&mut child).await;
            return;
        }
    }

    tokio::select! {
        () = terminate(&mut child, kill_grace) => {}
        _ = &mut kill_rx => kill_and_reap(&mut child).await,
    }
    token.acknowledge();
}

/// SIGTERM, then SIGKILL once `grace` has passed.
async fn terminate(child: &mut Child, grace: Duration) {
    if send_sigterm(child) {
        match tokio::time::timeout(grace, child.wait()).await {
            Ok(_) => {
                debug!("runner"; "app stopped");
                return;
            }
            Err(_) => {
                log!("runner"; "app still running after {}ms, killing", grace.as_millis());
            }
        }
    }

    kill_and_reap(child).await;
}

/// SIGKILL and reap.
async fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        debug!("runner"; "kill failed: {}", e);
    }
}

#[cfg(unix)]
fn send_sigterm(child: &Child) -> bool {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return false;
    };
    kill(Pid::from_raw(pid), Signal::SIGTERM).is_ok()
}

#[cfg(not(unix))]
fn send_sigterm(_child: &Child) -> bool {
    false
}

/// Log every line the app prints with the `app` prefix.
fn forward_output<R>(reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            log!("app"; "{}", line);
        }
    });
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::core::{StopError, StopOutcome, stop_signal};
    use std::time::Instant;
    use tempfile::TempDir;

    const STOP_TIMEOUT: Duration = Duration::from_secs(5);

    fn launcher(dir: &TempDir, run: &str) -> ProcessLauncher {
        ProcessLauncher::new(&test_config_at(dir.path(), &format!("[run]\n{run}")))
    }

    #[tokio::test]
    async fn test_stop_terminates_instance() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir, "command = [\"sleep\", \"30\"]");

        let (handle, token) = stop_signal();
        launcher.run(token).unwrap();

        let started = Instant::now();
        assert_eq!(handle.stop(STOP_TIMEOUT).await, Ok(StopOutcome::Acknowledged));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_sigterm_ignored_escalates_to_kill() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(
            &dir,
            "command = [\"sh\", \"-c\", \"trap '' TERM; while :; do sleep 1; done\"]\nkill_grace = 200",
        );

        let (handle, token) = stop_signal();
        launcher.run(token).unwrap();
        // Give the shell time to install its trap
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(handle.stop(STOP_TIMEOUT).await, Ok(StopOutcome::Acknowledged));
    }

    #[tokio::test]
    async fn test_instance_exited_on_its_own() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir, "command = [\"true\"]");

        let (handle, token) = stop_signal();
        launcher.run(token).unwrap();

        let deadline = Instant::now() + STOP_TIMEOUT;
        while !handle.is_finished() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(handle.stop(STOP_TIMEOUT).await, Ok(StopOutcome::AlreadyExited));
    }

    #[tokio::test]
    async fn test_force_stop_after_timeout() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(
            &dir,
            "command = [\"sh\", \"-c\", \"trap '' TERM; while :; do sleep 1; done\"]\nkill_grace = 10000\nstop_timeout = 10000",
        );

        let (handle, token) = stop_signal();
        launcher.run(token).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let timeout = Duration::from_millis(100);
        assert_eq!(handle.stop(timeout).await, Err(StopError::Timeout(timeout)));

        launcher.force_stop().await;
        assert!(launcher.current.is_none());
    }

    #[tokio::test]
    async fn test_force_stop_reaps_before_next_run() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(
            &dir,
            "command = [\"sh\", \"-c\", \"echo $$ > pid; trap '' TERM; while :; do sleep 1; done\"]\nkill_grace = 300",
        );

        let (handle, token) = stop_signal();
        launcher.run(token).unwrap();

        let pid_file = dir.path().join("pid");
        let deadline = Instant::now() + STOP_TIMEOUT;
        let pid = loop {
            let pid = std::fs::read_to_string(&pid_file)
                .ok()
                .and_then(|text| text.trim().parse::<i32>().ok());
            match pid {
                Some(pid) => break pid,
                None if Instant::now() < deadline => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                None => panic!("app never wrote its pid"),
            }
        };

        // Same budget as the grace period: the handoff gives up first
        let timeout = Duration::from_millis(300);
        assert_eq!(handle.stop(timeout).await, Err(StopError::Timeout(timeout)));

        launcher.force_stop().await;
        let alive = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None);
        assert_eq!(alive, Err(nix::errno::Errno::ESRCH));

        let (next, token) = stop_signal();
        launcher.run(token).unwrap();
        launcher.force_stop().await;
        drop(next);
    }

    #[tokio::test]
    async fn test_force_stop_without_instance_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir, "command = [\"true\"]");
        launcher.force_stop().await;
        assert!(launcher.current.is_none());
    }

    #[tokio::test]
    async fn test_spawn_failure_reported() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir, "command = [\"definitely-not-a-real-program-1234\"]");

        let (_handle, token) = stop_signal();
        assert!(launcher.run(token).is_err());
    }

    #[tokio::test]
    async fn test_runs_in_watch_root() {
        let dir = TempDir::new().unwrap();
        let mut launcher = launcher(&dir, "command = [\"sh\", \"-c\", \"touch started; sleep 30\"]");

        let (handle, token) = stop_signal();
        launcher.run(token).unwrap();

        let marker = dir.path().join("started");
        let deadline = Instant::now() + STOP_TIMEOUT;
        while !marker.exists() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(marker.exists());
        handle.stop(STOP_TIMEOUT).await.unwrap();
    }
}
