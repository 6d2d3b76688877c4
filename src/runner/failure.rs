//! Persisted record of the last build failure.
//!
//! The file exists only while the most recent cycle ended in an unresolved
//! failure. It is removed before every build and rewritten (never appended)
//! when a build fails.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::utils::exec::strip_ansi;

#[derive(Debug, Clone)]
pub struct FailureLog {
    path: PathBuf,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `text` (ANSI-stripped), replacing any previous content.
    pub fn create(&self, text: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, strip_ansi(text).as_bytes())?;
        crate::debug!("build"; "failure recorded in {}", self.path.display());
        Ok(())
    }

    /// Remove the file. Succeeds when it is already gone.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    #[cfg(test)]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    #[cfg(test)]
    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn log_in(dir: &TempDir) -> FailureLog {
        FailureLog::new(dir.path().join("tmp").join("runner-build-errors.log"))
    }

    #[test]
    fn test_create_makes_parent_dir() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.create("main.go:3: undefined: x").unwrap();
        assert!(log.exists());
        assert_eq!(log.read().unwrap(), "main.go:3: undefined: x");
    }

    #[test]
    fn test_create_overwrites() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.create("first failure, which is longer").unwrap();
        log.create("second").unwrap();
        assert_eq!(log.read().unwrap(), "second");
    }

    #[test]
    fn test_ansi_stripped() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.create("\x1b[31merror\x1b[0m: boom").unwrap();
        assert_eq!(log.read().unwrap(), "error: boom");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let log = log_in(&dir);

        log.remove().unwrap();
        log.create("x").unwrap();
        log.remove().unwrap();
        log.remove().unwrap();
        assert!(!log.exists());
    }
}
