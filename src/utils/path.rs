//! Path helpers.

use std::path::{Path, PathBuf};

/// Convert a path to absolute form, resolving symlinks when it exists.
///
/// Falls back to joining with cwd for paths that do not exist yet
/// (e.g. a tmp dir created later).
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Expand `~` and `$VAR`, then resolve a relative path against `base`.
///
/// Unknown variables leave the path untouched.
pub fn resolve_against(path: &Path, base: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let path = PathBuf::from(expanded);
    let full = if path.is_relative() {
        base.join(path)
    } else {
        path
    };
    normalize_path(&full)
}

/// Path relative to `root` with forward slashes, for event ids and URLs.
///
/// Paths outside `root` are returned unchanged.
pub fn slash_relative(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative() {
        let base = Path::new("/definitely/missing/project");
        assert_eq!(
            resolve_against(Path::new("tmp"), base),
            PathBuf::from("/definitely/missing/project/tmp")
        );
    }

    #[test]
    fn test_resolve_absolute_kept() {
        let base = Path::new("/base");
        assert_eq!(
            resolve_against(Path::new("/elsewhere/log.txt"), base),
            PathBuf::from("/elsewhere/log.txt")
        );
    }

    #[test]
    fn test_slash_relative() {
        let root = Path::new("/project");
        assert_eq!(
            slash_relative(Path::new("/project/src/main.go"), root),
            "src/main.go"
        );
        assert_eq!(slash_relative(Path::new("/other/a.go"), root), "/other/a.go");
    }

    #[test]
    fn test_normalize_existing_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let normalized = normalize_path(dir.path());
        assert!(normalized.is_absolute());
        assert!(normalized.exists());
    }
}
