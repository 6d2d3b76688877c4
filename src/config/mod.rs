//! Runner configuration management for `freshet.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── watch      # [watch]
//! │   ├── build      # [build]
//! │   ├── run        # [run]
//! │   └── reload     # [reload], [log]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # RunnerConfig (this file)
//! ```
//!
//! The file is optional: without one every section falls back to its
//! defaults and the current directory is watched.

pub mod section;
pub mod types;
mod util;

pub use util::{DEFAULT_CONFIG_NAME, find_config_file};

pub use section::{BuildConfig, LogConfig, ReloadConfig, RunConfig, WatchConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, RunArgs},
    debug, log,
    utils::path::resolve_against,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing freshet.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Absolute path to the config file, even when it does not exist
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Absolute watch root, also the working directory of child processes
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub reload: ReloadConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl RunnerConfig {
    /// Load configuration for the `run` command.
    ///
    /// Searches upward from cwd for the config file. Relative paths in the
    /// file resolve against the file's directory; without a file they
    /// resolve against cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "{} not found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    ..Self::default()
                }
            }
        };

        let base = config
            .config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);
        config.finalize(&base);
        config.apply_run_args(&cli.run_args(), cli.verbose);
        crate::logger::set_verbose(config.log.verbose);

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve every path to absolute form.
    ///
    /// `watch.root` resolves against `base`; the tmp dir, failure log and
    /// ignored dirs resolve against the watch root. The tmp dir is always
    /// ignored so build output never retriggers a cycle.
    fn finalize(&mut self, base: &Path) {
        self.config_path = crate::utils::path::normalize_path(&self.config_path);

        let root = resolve_against(&self.watch.root, base);
        self.watch.root = root.clone();
        self.root = root;

        self.build.tmp_dir = resolve_against(&self.build.tmp_dir, &self.root);
        self.build.failure_log = resolve_against(&self.build.failure_log, &self.root);

        self.watch.resolve_ignored();
        if !self.watch.ignored.contains(&self.build.tmp_dir) {
            self.watch.ignored.push(self.build.tmp_dir.clone());
        }
        self.watch.normalize_extensions();
    }

    /// Apply `run` command overrides.
    fn apply_run_args(&mut self, args: &RunArgs, verbose: bool) {
        Self::update_option(&mut self.build.delay, args.delay.as_ref());
        Self::update_option(&mut self.reload.port, args.port.as_ref());
        if args.no_reload {
            self.reload.enable = false;
        }
        if verbose {
            self.log.verbose = true;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.watch.validate(&mut diag);
        self.build.validate(&self.root, &mut diag);
        self.run.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config without path resolution.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> RunnerConfig {
    let (parsed, ignored) = RunnerConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with all paths resolved.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> RunnerConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join(DEFAULT_CONFIG_NAME);
    config.finalize(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = RunnerConfig::from_str("[watch\nroot = \".\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[watch]\nroot = \".\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = RunnerConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.watch.root, PathBuf::from("."));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = RunnerConfig::parse_with_ignored("[build]\ndelay = 10").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_finalize_resolves_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let root = crate::utils::path::normalize_path(dir.path());

        assert_eq!(config.root, root);
        assert_eq!(config.build.tmp_dir, root.join("tmp"));
        assert_eq!(
            config.build.failure_log,
            root.join("tmp/runner-build-errors.log")
        );
        assert!(config.watch.is_ignored(&root.join("tmp/runner-build")));
        assert!(config.watch.is_ignored(&root.join("assets/app.css")));
        assert!(!config.watch.is_ignored(&root.join("main.go")));
    }

    #[test]
    fn test_custom_tmp_dir_always_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[watch]\nignored = []\n[build]\ntmp_dir = \".out\"");
        let root = crate::utils::path::normalize_path(dir.path());

        assert_eq!(config.watch.ignored, vec![root.join(".out")]);
    }

    #[test]
    fn test_apply_run_args() {
        let mut config = RunnerConfig::default();
        let args = RunArgs {
            delay: Some(50),
            no_reload: true,
            port: Some(40000),
        };
        config.apply_run_args(&args, true);

        assert_eq!(config.build.delay, 50);
        assert!(!config.reload.enable);
        assert_eq!(config.reload.port, 40000);
        assert!(config.log.verbose);
    }

    #[test]
    fn test_apply_empty_run_args_keeps_config() {
        let mut config = test_parse_config("[build]\ndelay = 900");
        config.apply_run_args(&RunArgs::default(), false);
        assert_eq!(config.build.delay, 900);
        assert!(config.reload.enable);
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(
            dir.path(),
            "[build]\ncommand = []\n[run]\ncommand = []\nstop_timeout = 0",
        );

        let err = config.validate().unwrap_err();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::Diagnostics(diag)) => assert_eq!(diag.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_missing_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(
            dir.path(),
            "[watch]\nroot = \"missing\"\n[build]\ncommand = [\"sh\", \"-c\", \"true\"]",
        );
        assert!(config.validate().is_err());
    }
}
