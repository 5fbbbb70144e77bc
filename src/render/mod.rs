//! Render scheduling over a bounded worker pool.
//!
//! [`RenderScheduler::render`] never blocks on submission and never fails:
//! a saturated pool, a missing environment, a script error or a blown
//! deadline all degrade to an empty string. The worst user-visible symptom
//! is a blank component, never a crash or a hang past the deadline.

mod component;
mod context;
mod scheduler;

pub use component::{Component, ComponentState};
pub use scheduler::{Pending, RenderScheduler};

pub(crate) use context::WorkerContext;
