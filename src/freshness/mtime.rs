//! Mtime scanning over a source file set.
//!
//! Policy notes:
//! - Zero-length files are skipped: they are placeholders a bundler has
//!   created but not yet written, and loading them would always fail.
//! - A stamp never decreases. If file timestamps regress (clock skew,
//!   restored backups), no reload is triggered.

use std::path::Path;
use std::time::SystemTime;

use super::SourceFileSet;

/// Newest known modification time across a tracked file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangeStamp(SystemTime);

impl ChangeStamp {
    /// The "never seen anything" stamp; every real mtime is newer.
    pub const ZERO: Self = Self(SystemTime::UNIX_EPOCH);

    pub fn new(time: SystemTime) -> Self {
        Self(time)
    }

    pub fn time(&self) -> SystemTime {
        self.0
    }
}

impl Default for ChangeStamp {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Result of one change scan.
#[derive(Debug, Clone, Copy)]
pub struct Scan {
    /// Newest observed mtime exceeds the last stamp
    pub changed: bool,
    /// Stamp to persist for the next scan (never lower than the last one)
    pub stamp: ChangeStamp,
}

/// Compute the newest mtime over `files` and compare it to `last`.
///
/// Pure: no state is stored here, the caller decides whether and where to
/// persist `Scan::stamp`. Files that cannot be stat'ed contribute nothing,
/// so an empty or missing file set never triggers a reload.
pub fn scan(files: &SourceFileSet, last: ChangeStamp) -> Scan {
    let newest = newest_mtime(files);
    Scan {
        changed: newest > last,
        stamp: last.max(newest),
    }
}

fn newest_mtime(files: &SourceFileSet) -> ChangeStamp {
    files
        .iter()
        .filter_map(file_mtime)
        .max()
        .unwrap_or(ChangeStamp::ZERO)
}

fn file_mtime(path: &Path) -> Option<ChangeStamp> {
    let meta = path.metadata().ok()?;
    if meta.len() == 0 {
        return None;
    }
    meta.modified().ok().map(ChangeStamp::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn stamp_at(secs: u64) -> ChangeStamp {
        ChangeStamp::new(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    fn write_with_mtime(dir: &TempDir, name: &str, content: &str, secs: u64) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
        path
    }

    #[test]
    fn test_scan_detects_newer_file() {
        let dir = TempDir::new().unwrap();
        let a = write_with_mtime(&dir, "a.rhai", "let a = 1;", 100);
        let b = write_with_mtime(&dir, "b.rhai", "let b = 2;", 300);
        let files = SourceFileSet::new(vec![a, b]);

        let scan = scan(&files, stamp_at(200));
        assert!(scan.changed);
        assert_eq!(scan.stamp, stamp_at(300));
    }

    #[test]
    fn test_scan_unchanged_at_exact_stamp() {
        let dir = TempDir::new().unwrap();
        let a = write_with_mtime(&dir, "a.rhai", "let a = 1;", 100);
        let b = write_with_mtime(&dir, "b.rhai", "let b = 2;", 300);
        let files = SourceFileSet::new(vec![a, b]);

        let scan = scan(&files, stamp_at(300));
        assert!(!scan.changed);
        assert_eq!(scan.stamp, stamp_at(300));
    }

    #[test]
    fn test_zero_length_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let empty = write_with_mtime(&dir, "empty.rhai", "", 9999);
        let files = SourceFileSet::new(vec![empty]);

        let scan = scan(&files, ChangeStamp::ZERO);
        assert!(!scan.changed);
        assert_eq!(scan.stamp, ChangeStamp::ZERO);
    }

    #[test]
    fn test_empty_set_never_changes() {
        let files = SourceFileSet::new(vec![]);
        let scan = scan(&files, ChangeStamp::ZERO);
        assert!(!scan.changed);
        assert_eq!(scan.stamp, ChangeStamp::ZERO);
    }

    #[test]
    fn test_missing_file_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        let a = write_with_mtime(&dir, "a.rhai", "let a = 1;", 100);
        let gone = dir.path().join("gone.rhai");
        let files = SourceFileSet::new(vec![a, gone]);

        let scan = scan(&files, ChangeStamp::ZERO);
        assert!(scan.changed);
        assert_eq!(scan.stamp, stamp_at(100));
    }

    #[test]
    fn test_stamp_never_regresses() {
        let dir = TempDir::new().unwrap();
        let a = write_with_mtime(&dir, "a.rhai", "let a = 1;", 100);
        let files = SourceFileSet::new(vec![a]);

        // Stamp is ahead of every file (clock skew): no reload, stamp kept.
        let scan = scan(&files, stamp_at(500));
        assert!(!scan.changed);
        assert_eq!(scan.stamp, stamp_at(500));
    }
}
