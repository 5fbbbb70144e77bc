//! Hot reload: atomic publication of freshly built environments.
//!
//! Two strategies, both feeding the render scheduler through
//! [`EnvironmentSource`]:
//!
//! - [`ReloadLoop`]: a dedicated background thread polls the source files on
//!   a fixed interval and publishes rebuilt environments into an
//!   [`EnvironmentSlot`].
//! - [`Reloading`]: a generic decorator that checks for changes at call
//!   time and swaps its wrapped value in place, falling back to the last
//!   good one when a rebuild fails.
//!
//! In both, publication is a single atomic reference swap: readers either
//! see the old environment or the new one, never a mix, and a render already
//! holding the old one simply finishes against it.

mod handle;
mod poller;

pub use handle::Reloading;
pub use poller::{LoopState, ReloadLoop, ReloadLoopHandle};

use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwapOption;

use crate::engine::ExecutionEnvironment;

/// Anything that can hand out the current execution environment.
///
/// The seam between render scheduling and reload strategy: the scheduler
/// does not care whether environments are pushed by a poll loop or pulled
/// on demand.
pub trait EnvironmentSource: Send + Sync {
    fn environment(&self) -> Result<Arc<ExecutionEnvironment>>;
}

/// The single published environment, swapped atomically on reload.
#[derive(Default)]
pub struct EnvironmentSlot {
    current: ArcSwapOption<ExecutionEnvironment>,
}

impl EnvironmentSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current environment, if one has been published.
    pub fn load(&self) -> Option<Arc<ExecutionEnvironment>> {
        self.current.load_full()
    }

    /// Publish a new environment. Single reference swap; readers holding
    /// the previous one keep it alive until they finish.
    pub fn store(&self, env: Arc<ExecutionEnvironment>) {
        self.current.store(Some(env));
    }
}

impl EnvironmentSource for EnvironmentSlot {
    fn environment(&self) -> Result<Arc<ExecutionEnvironment>> {
        self.load().context("no environment published yet")
    }
}

impl EnvironmentSource for Reloading<ExecutionEnvironment> {
    fn environment(&self) -> Result<Arc<ExecutionEnvironment>> {
        self.current()
    }
}
