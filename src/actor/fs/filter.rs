use std::path::{Path, PathBuf};

use super::types::ChangeKind;
use crate::config::{RunnerConfig, WatchConfig};
use crate::core::ChangeEvent;
use crate::utils::path::slash_relative;

/// Decides which notify events become change events.
pub(super) struct ChangeFilter {
    root: PathBuf,
    watch: WatchConfig,
}

impl ChangeFilter {
    pub(super) fn new(config: &RunnerConfig) -> Self {
        Self {
            root: config.root.clone(),
            watch: config.watch.clone(),
        }
    }

    /// Change events for every accepted path of `event`, in order.
    pub(super) fn events(&self, event: &notify::Event) -> Vec<ChangeEvent> {
        let Some(kind) = ChangeKind::from_notify(&event.kind) else {
            return Vec::new();
        };

        event
            .paths
            .iter()
            .filter(|path| self.accepts(path))
            .map(|path| ChangeEvent::with_detail(&slash_relative(path, &self.root), kind.label()))
            .collect()
    }

    pub(super) fn accepts(&self, path: &Path) -> bool {
        if is_temp_file(path) || self.watch.is_ignored(path) {
            return false;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.watch.accepts_extension(ext)
    }
}

/// Editor swap/backup files and dotfiles.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}
