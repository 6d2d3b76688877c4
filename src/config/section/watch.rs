//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! root = "."                                  # Directory to watch recursively
//! ignored = ["assets", "tmp"]                 # Directories to skip (relative to root)
//! extensions = ["go", "tpl", "tmpl", "html"]  # Files that trigger a rebuild
//! ```
//!
//! An empty `extensions` list accepts every file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory watched recursively. Also the working directory of the
    /// build and run commands.
    pub root: PathBuf,

    /// Directories whose changes are ignored.
    pub ignored: Vec<PathBuf>,

    /// File extensions that trigger a cycle (with or without leading dot).
    pub extensions: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            ignored: vec![PathBuf::from("assets"), PathBuf::from("tmp")],
            extensions: ["go", "tpl", "tmpl", "html"].map(String::from).to_vec(),
        }
    }
}

impl WatchConfig {
    const ROOT: FieldPath = FieldPath::new("watch.root");

    /// Strip leading dots and surrounding whitespace from extensions.
    pub(crate) fn normalize_extensions(&mut self) {
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
    }

    /// Resolve `ignored` entries against the watch root.
    pub(crate) fn resolve_ignored(&mut self) {
        let root = self.root.clone();
        for dir in &mut self.ignored {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }
    }

    /// Whether `ext` (without dot) triggers a cycle.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.is_empty()
            || self
                .extensions
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(ext))
    }

    /// Whether `path` is inside an ignored directory.
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.ignored.iter().any(|dir| path.starts_with(dir))
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.root.is_dir() {
            diag.error(
                Self::ROOT,
                format!("directory `{}` does not exist", self.root.display()),
            );
        }
    }
}
