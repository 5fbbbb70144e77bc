//! Ordered, immutable set of script source files.

use std::path::{Path, PathBuf};

/// The script files an environment is built from, in load order.
///
/// Order matters: later files may reference globals defined by earlier ones,
/// so iteration order is exactly construction order. The set is read-only
/// after construction.
#[derive(Debug, Clone)]
pub struct SourceFileSet {
    files: Vec<PathBuf>,
}

impl SourceFileSet {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files }
    }

    /// Resolve relative paths against a base directory (the config file's
    /// parent). Absolute paths are kept as-is.
    pub fn resolve(base: &Path, files: &[PathBuf]) -> Self {
        let files = files
            .iter()
            .map(|f| {
                if f.is_absolute() {
                    f.clone()
                } else {
                    base.join(f)
                }
            })
            .collect();
        Self { files }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
