//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! command = ["go", "build", "-o", "tmp/runner-build", "."]
//! delay = 600                                  # Debounce delay in milliseconds
//! failure_log = "tmp/runner-build-errors.log"  # Last build failure, removed on success
//! tmp_dir = "tmp"                              # Scratch directory (created at startup)
//! timeout = 120                                # Optional: kill builds running longer (seconds)
//! ```
//!
//! Arguments may reference `$RUNNER_*` variables, e.g. `$RUNNER_TMP_DIR/app`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{ConfigDiagnostics, FieldPath};

/// Build step settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build command and arguments.
    pub command: Vec<String>,

    /// Quiet period after the first change before building (milliseconds).
    pub delay: u64,

    /// File holding the diagnostic text of the last failed build.
    pub failure_log: PathBuf,

    /// Scratch directory for build output.
    pub tmp_dir: PathBuf,

    /// Build timeout in seconds (none by default).
    pub timeout: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: ["go", "build", "-o", "tmp/runner-build", "."]
                .map(String::from)
                .to_vec(),
            delay: 600,
            failure_log: PathBuf::from("tmp/runner-build-errors.log"),
            tmp_dir: PathBuf::from("tmp"),
            timeout: None,
        }
    }
}

impl BuildConfig {
    const COMMAND: FieldPath = FieldPath::new("build.command");
    const TIMEOUT: FieldPath = FieldPath::new("build.timeout");

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn validate(&self, root: &Path, diag: &mut ConfigDiagnostics) {
        match self.command.first() {
            None => diag.error(Self::COMMAND, "must not be empty"),
            Some(program) => validate_program(Self::COMMAND, program, root, diag),
        }

        if self.timeout == Some(0) {
            diag.error_with_hint(
                Self::TIMEOUT,
                "must be greater than 0",
                "remove the field to disable the timeout",
            );
        }
    }
}

/// Check that a program can be found, either on PATH or relative to root.
///
/// Programs containing `$` are resolved at run time and skipped here.
pub(crate) fn validate_program(
    field: FieldPath,
    program: &str,
    root: &Path,
    diag: &mut ConfigDiagnostics,
) {
    if program.contains('$') {
        return;
    }

    let has_separator = program.contains('/') || program.contains('\\');
    let found = if has_separator {
        root.join(program).exists()
    } else {
        which::which(program).is_ok()
    };

    if !found {
        diag.error_with_hint(
            field,
            format!("`{program}` not found"),
            "install it or use an absolute path",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_build_config() {
        let config = test_parse_config(
            "[build]\ncommand = [\"cargo\", \"build\"]\ndelay = 250\ntimeout = 30",
        );
        assert_eq!(config.build.command, vec!["cargo", "build"]);
        assert_eq!(config.build.delay(), Duration::from_millis(250));
        assert_eq!(config.build.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_build_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.build.delay, 600);
        assert_eq!(config.build.timeout(), None);
        assert!(
            config
                .build
                .failure_log
                .ends_with("tmp/runner-build-errors.log")
        );
    }

    #[test]
    fn test_empty_command_rejected() {
        let build = BuildConfig {
            command: Vec::new(),
            ..BuildConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(Path::new("."), &mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, BuildConfig::COMMAND);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let build = BuildConfig {
            command: vec!["$RUNNER_WD/build.sh".into()],
            timeout: Some(0),
            ..BuildConfig::default()
        };
        let mut diag = ConfigDiagnostics::new();
        build.validate(Path::new("."), &mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.errors()[0].field, BuildConfig::TIMEOUT);
    }

    #[test]
    fn test_missing_program_reported() {
        let mut diag = ConfigDiagnostics::new();
        validate_program(
            BuildConfig::COMMAND,
            "definitely-not-a-real-program-1234",
            Path::new("."),
            &mut diag,
        );
        assert!(diag.has_errors());
    }

    #[test]
    fn test_relative_program_checked_against_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("build.sh"), "#!/bin/sh\n").unwrap();

        let mut diag = ConfigDiagnostics::new();
        validate_program(BuildConfig::COMMAND, "./build.sh", dir.path(), &mut diag);
        assert!(!diag.has_errors());
    }
}
