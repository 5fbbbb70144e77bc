//! Call-time reloading decorator.

use std::sync::Arc;

use anyhow::Result;
use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

use crate::freshness::{self, ChangeStamp, SourceFileSet};
use crate::log;

/// Wraps any capability with reload-on-change, fallback-on-failure
/// semantics.
///
/// Every [`current`](Self::current) call first checks whether the backing
/// files changed since the last attempt. If so (or on the very first call,
/// when no baseline exists), the supplier runs and, on success, the fresh
/// value is swapped in atomically. On failure the previous value keeps
/// serving; only a first load with nothing to fall back to propagates the
/// error to the caller.
///
/// Callers dispatch against the `Arc<T>` they got: a call in flight against
/// an old value completes against it even if a swap happens meanwhile.
pub struct Reloading<T> {
    current: ArcSwapOption<T>,
    files: SourceFileSet,
    /// Guards the check-and-swap sequence; dispatch happens outside it.
    stamp: Mutex<ChangeStamp>,
    supplier: Box<dyn Fn() -> Result<T> + Send + Sync>,
}

impl<T> Reloading<T> {
    pub fn new(
        files: SourceFileSet,
        supplier: impl Fn() -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            files,
            stamp: Mutex::new(ChangeStamp::ZERO),
            supplier: Box::new(supplier),
        }
    }

    /// The implementation to dispatch this call to.
    pub fn current(&self) -> Result<Arc<T>> {
        let mut stamp = self.stamp.lock();
        let previous = self.current.load_full();

        if let Some(prev) = &previous {
            let scan = freshness::scan(&self.files, *stamp);
            if !scan.changed {
                return Ok(Arc::clone(prev));
            }
            // Persist before attempting: a failed rebuild is not retried
            // until the files change again.
            *stamp = scan.stamp;
        } else {
            // No baseline yet: always attempt, but record what we saw.
            *stamp = freshness::scan(&self.files, *stamp).stamp;
        }

        match (self.supplier)() {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                self.current.store(Some(Arc::clone(&fresh)));
                Ok(fresh)
            }
            Err(err) => match previous {
                Some(prev) => {
                    log!("warning"; "reload failed, keeping previous implementation: {err:#}");
                    Ok(prev)
                }
                None => Err(err),
            },
        }
    }
}
