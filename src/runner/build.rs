//! Build step backed by an external command.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::{BuildResult, Builder, env};
use crate::config::RunnerConfig;
use crate::utils::exec::{Cmd, ExecError, format_error};
use crate::{debug, log};

/// Runs `build.command` in the watch root.
#[derive(Debug)]
pub struct CommandBuilder {
    command: Vec<String>,
    root: PathBuf,
    vars: FxHashMap<String, String>,
    timeout: Option<Duration>,
}

impl CommandBuilder {
    pub fn new(config: &RunnerConfig) -> Self {
        let vars = env::runner_vars(config);
        Self {
            command: env::resolve_args(&config.build.command, &vars),
            root: config.root.clone(),
            vars,
            timeout: config.build.timeout(),
        }
    }
}

impl Builder for CommandBuilder {
    async fn build(&mut self) -> BuildResult {
        log!("build"; "building...");
        debug!("build"; "`{}`", self.command.join(" "));

        let started = Instant::now();
        let output = Cmd::from_slice(self.command.as_slice())
            .cwd(&self.root)
            .envs(&self.vars)
            .timeout(self.timeout)
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    log!("build"; "{}", stderr);
                }
                debug!("build"; "finished in {:.2?}", started.elapsed());
                BuildResult::Success
            }
            Ok(output) => {
                let name = self.command.first().map_or("", String::as_str);
                BuildResult::Failure(format_error(name, &output))
            }
            Err(ExecError::Timeout { after, .. }) => BuildResult::Failure(format!(
                "build timed out after {}s",
                after.as_secs()
            )),
            Err(err) => BuildResult::Failure(format!("{:#}", anyhow::Error::from(err))),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use tempfile::TempDir;

    fn builder(dir: &TempDir, build: &str) -> CommandBuilder {
        CommandBuilder::new(&test_config_at(dir.path(), &format!("[build]\n{build}")))
    }

    #[tokio::test]
    async fn test_success() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder(&dir, "command = [\"sh\", \"-c\", \"touch built\"]");

        assert_eq!(builder.build().await, BuildResult::Success);
        assert!(dir.path().join("built").exists());
    }

    #[tokio::test]
    async fn test_failure_carries_output() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder(
            &dir,
            "command = [\"sh\", \"-c\", \"echo 'main.go:3: undefined: x' >&2; exit 1\"]",
        );

        match builder.build().await {
            BuildResult::Failure(text) => assert!(text.contains("main.go:3: undefined: x")),
            BuildResult::Success => panic!("build should fail"),
        }
    }

    #[tokio::test]
    async fn test_runner_env_visible_to_build() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder(
            &dir,
            "command = [\"sh\", \"-c\", \"test \\\"${DEV_RUNNER}\\\" = 1 && test -n \\\"${RUNNER_WD}\\\"\"]",
        );

        assert_eq!(builder.build().await, BuildResult::Success);
    }

    #[tokio::test]
    async fn test_args_substituted() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder(
            &dir,
            "command = [\"mkdir\", \"-p\", \"$RUNNER_TMP_DIR/out\"]",
        );

        assert_eq!(builder.build().await, BuildResult::Success);
        assert!(dir.path().join("tmp/out").is_dir());
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder(&dir, "command = [\"sleep\", \"5\"]");
        builder.timeout = Some(Duration::from_millis(100));

        match builder.build().await {
            BuildResult::Failure(text) => assert!(text.starts_with("build timed out")),
            BuildResult::Success => panic!("build should time out"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_failure() {
        let dir = TempDir::new().unwrap();
        let mut builder = builder(&dir, "command = [\"definitely-not-a-real-program-1234\"]");

        match builder.build().await {
            BuildResult::Failure(text) => assert!(text.contains("failed to execute")),
            BuildResult::Success => panic!("build should fail"),
        }
    }
}
