//! Append-only line writer with size-based rotation.
//!
//! Before each write the current file's size is checked against the
//! [`RotationPolicy`]. An oversized file is renamed to
//! `<name>.<timestamp>` (local time, millisecond precision) and a fresh file is
//! started. Only the newest `max_backups` rotated files are kept.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Limits applied by [`RotatingFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size above which the file is rotated before the next write.
    pub max_bytes: u64,
    /// Rotated files kept on disk.
    pub max_backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            max_backups: 3,
        }
    }
}

/// Thread-safe rotating line writer. The file is opened lazily on first write.
pub struct RotatingFile {
    path: PathBuf,
    policy: RotationPolicy,
    handle: Mutex<Option<File>>,
}

impl RotatingFile {
    #[must_use]
    pub const fn new(path: PathBuf, policy: RotationPolicy) -> Self {
        Self {
            path,
            policy,
            handle: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline, rotating first if needed.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from rotating, opening, or writing the file, or an
    /// error if a previous writer panicked while holding the lock.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut handle = self
            .handle
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("writer lock poisoned: {e}")))?;

        if self.needs_rotation() {
            *handle = None;
            self.rotate()?;
        }

        if handle.is_none() {
            *handle = Some(OpenOptions::new().create(true).append(true).open(&self.path)?);
        }
        if let Some(file) = handle.as_mut() {
            writeln!(file, "{line}")?;
            file.flush()?;
        }
        Ok(())
    }

    fn needs_rotation(&self) -> bool {
        fs::metadata(&self.path).is_ok_and(|m| m.len() > self.policy.max_bytes)
    }

    fn backup_prefix(&self) -> Option<String> {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| format!("{n}."))
    }

    fn rotate(&self) -> io::Result<()> {
        let prefix = self
            .backup_prefix()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "trace path has no file name"))?;
        let stamp = Local::now().format("%Y%m%dT%H%M%S%.3f");
        let backup = self.path.with_file_name(format!("{prefix}{stamp}"));

        if self.path.exists() {
            fs::rename(&self.path, &backup)?;
        }
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        prune_backups(dir, &prefix, self.policy.max_backups)
    }
}

/// Deletes all but the newest `keep` files in `dir` whose names start with
/// `prefix`. Timestamp suffixes sort chronologically, so name order is age
/// order.
fn prune_backups(dir: &Path, prefix: &str, keep: usize) -> io::Result<()> {
    let mut backups: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    backups.sort();

    let excess = backups.len().saturating_sub(keep);
    for old in &backups[..excess] {
        if let Err(e) = fs::remove_file(old) {
            tracing::debug!(path = %old.display(), error = %e, "failed to remove old trace backup");
        }
    }
    Ok(())
}

impl std::fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFile")
            .field("path", &self.path)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
