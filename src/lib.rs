//! Sprig - a hot-reloading script renderer for server-side UI components.
//!
//! Components are rhai expressions evaluated against an execution
//! environment built from a set of script files. When those files change on
//! disk, a fresh environment is built and published atomically; in-flight
//! renders finish against the old one, and a failed rebuild never takes the
//! last good environment away. Renders run on a bounded worker pool behind a
//! strict per-call deadline; everything that can go wrong degrades to an
//! empty string, never to a crash or an unbounded wait.
//!
//! # Embedding
//!
//! ```ignore
//! let files = config.source_files();
//! let handle = ReloadLoop::spawn(EnvironmentBuilder::new(files), interval, true);
//! let scheduler = RenderScheduler::new(handle.slot(), Arc::new(LogSink), 6, 6, timeout);
//!
//! let markup = scheduler
//!     .render(&component, &ComponentState::new(data_json, location))
//!     .wait();
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod freshness;
pub mod logger;
pub mod metrics;
pub mod reload;
pub mod render;

pub use config::RendererConfig;
pub use engine::{EnvironmentBuilder, ExecutionEnvironment, LoadError, RenderError};
pub use freshness::{ChangeStamp, SourceFileSet};
pub use reload::{EnvironmentSlot, EnvironmentSource, ReloadLoop, Reloading};
pub use render::{Component, ComponentState, Pending, RenderScheduler};
