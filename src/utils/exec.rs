//! External command execution utilities.
//!
//! Provides a Builder-based API for running the build and application
//! commands on the tokio runtime.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Run to completion, capturing output
//! let output = Cmd::from_slice(&["go", "build", "."])
//!     .cwd(root)
//!     .timeout(Some(Duration::from_secs(120)))
//!     .output()
//!     .await?;
//!
//! // Long-running child with piped stdout/stderr
//! let child = Cmd::from_slice(&command).cwd(root).envs(vars).spawn()?;
//! ```

use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Output, Stdio},
    sync::OnceLock,
    time::Duration,
};
use thiserror::Error;
use tokio::process::{Child, Command};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
///
/// Children are spawned with `kill_on_drop`, so dropping the future or the
/// [`Child`] never leaves a process behind.
#[derive(Default, Debug)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    timeout: Option<Duration>,
}

impl Cmd {
    /// Create from a command array (e.g., `["go", "build", "."]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Kill the process if [`Cmd::output`] takes longer than `limit`.
    pub fn timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().cloned())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run to completion and capture output.
    ///
    /// A non-zero exit is not an error here; check `output.status`.
    pub async fn output(self) -> Result<Output, ExecError> {
        let program = self.program_name();
        let mut command = self.command();
        let future = command.output();

        let result = match self.timeout {
            Some(after) => tokio::time::timeout(after, future)
                .await
                .map_err(|_| ExecError::Timeout {
                    program: program.clone(),
                    after,
                })?,
            None => future.await,
        };

        result.map_err(|source| ExecError::Spawn { program, source })
    }

    /// Spawn a long-running child with piped stdout/stderr.
    pub fn spawn(self) -> Result<Child, ExecError> {
        self.command().spawn().map_err(|source| ExecError::Spawn {
            program: self.program_name(),
            source,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());
    re.replace_all(s, "")
}

/// Format error message for failed command: stderr first, then stdout.
pub fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}\n", output.status);
    let stderr_trimmed = stderr.trim();
    if !stderr_trimmed.is_empty() {
        msg.push_str(stderr_trimmed);
    }

    let stdout_trimmed = stdout.trim();
    if !stdout_trimmed.is_empty() {
        if !stderr_trimmed.is_empty() {
            msg.push('\n');
        }
        msg.push_str(stdout_trimmed);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
