//! Script execution environments.
//!
//! An [`ExecutionEnvironment`] is one fully-loaded, immutable rhai runtime:
//! engine, the function namespace from all source files, and the baseline
//! globals those files established. Environments are never mutated after
//! construction; a reload builds a brand-new one via [`EnvironmentBuilder`]
//! and swaps it in atomically elsewhere (`crate::reload`).

mod builder;
mod environment;
mod error;

pub use builder::EnvironmentBuilder;
pub use environment::{ExecutionEnvironment, LOCATION_VAR, PROPS_VAR};
pub use error::{LoadError, RenderError};
