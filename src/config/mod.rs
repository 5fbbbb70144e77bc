//! Renderer configuration management for `sprig.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                         |
//! |----------------|-------------------------------------------------|
//! | `[scripts]`    | Component source files, in load order           |
//! | `[reload]`     | Hot-reload toggle, poll interval, strategy      |
//! | `[render]`     | Worker pool size, queue bound, render deadline  |
//! | `[components]` | Component id → render expression                |
//! | `[serve]`      | Demo HTTP host (interface, port, root component)|

mod error;
mod section;

pub use error::ConfigError;
pub use section::{ReloadConfig, ReloadStrategy, RenderConfig, ScriptsConfig, ServeConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::freshness::SourceFileSet;
use crate::render::Component;

/// Root configuration structure representing sprig.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Script source files
    pub scripts: ScriptsConfig,

    /// Hot-reload behavior
    pub reload: ReloadConfig,

    /// Worker pool and deadline
    pub render: RenderConfig,

    /// Component id → render expression
    pub components: FxHashMap<String, String>,

    /// Demo HTTP host settings
    pub serve: ServeConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            scripts: ScriptsConfig::default(),
            reload: ReloadConfig::default(),
            render: RenderConfig::default(),
            components: FxHashMap::default(),
            serve: ServeConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Load and validate configuration from a config file path.
    ///
    /// The project root (base for relative script paths) is the config
    /// file's parent directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_owned(), e))?;

        let mut config: Self = toml::from_str(&content)?;
        config.config_path = path.to_owned();
        config.root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        config.validate()?;
        Ok(config)
    }

    /// Script files resolved against the project root, in load order.
    pub fn source_files(&self) -> SourceFileSet {
        SourceFileSet::resolve(&self.root, &self.scripts.files)
    }

    /// Look up a configured component by id.
    pub fn component(&self, id: &str) -> Option<Component> {
        self.components
            .get(id)
            .map(|expr| Component::new(id, expr.clone()))
    }

    /// Bound on queued render jobs (defaults to the worker count).
    pub fn queue_capacity(&self) -> usize {
        self.render.queue.unwrap_or(self.render.workers)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.reload.interval_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render.timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scripts.files.is_empty() {
            return Err(ConfigError::Validation(
                "scripts.files must list at least one source file".into(),
            ));
        }
        if self.render.workers == 0 {
            return Err(ConfigError::Validation(
                "render.workers must be at least 1".into(),
            ));
        }
        if self.render.queue == Some(0) {
            return Err(ConfigError::Validation(
                "render.queue must be at least 1".into(),
            ));
        }
        if self.render.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "render.timeout_ms must be at least 1".into(),
            ));
        }
        if self.reload.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "reload.interval_ms must be at least 1".into(),
            ));
        }
        if self.components.is_empty() {
            return Err(ConfigError::Validation(
                "[components] must define at least one component".into(),
            ));
        }
        if !self.components.contains_key(&self.serve.component) {
            return Err(ConfigError::Validation(format!(
                "serve.component `{}` is not defined in [components]",
                self.serve.component
            )));
        }
        Ok(())
    }
}

/// Parse a config snippet without validation (sections use this in tests).
#[cfg(test)]
pub(crate) fn test_parse_config(content: &str) -> RendererConfig {
    toml::from_str(content).unwrap()
}
