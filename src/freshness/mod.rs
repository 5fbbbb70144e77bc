//! Change detection for script source files, based on modification times.
//!
//! The detector is pure: it computes the newest mtime across a file set and
//! compares it against the caller's last recorded stamp. Who persists the
//! stamp (the reload loop, a reloading handle) is the caller's business.

mod fileset;
mod mtime;

pub use fileset::SourceFileSet;
pub use mtime::{ChangeStamp, Scan, scan};
