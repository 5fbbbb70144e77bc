//! Configuration section definitions.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::Deserialize;

/// `[scripts]`: the component source files, in load order.
///
/// ```toml
/// [scripts]
/// files = ["dist/components.rhai"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Paths relative to the config file's directory (absolute paths kept).
    /// Order matters: later files may use earlier files' definitions.
    pub files: Vec<PathBuf>,
}

/// `[reload]`: hot-reload behavior.
///
/// ```toml
/// [reload]
/// enabled = true       # false: build once at startup, never reload
/// interval_ms = 200    # poll interval (strategy = "poll")
/// strategy = "poll"    # or "on-demand": check at render time
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub strategy: ReloadStrategy,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 200,
            strategy: ReloadStrategy::Poll,
        }
    }
}

/// How changed sources are picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReloadStrategy {
    /// Background loop polls the files and publishes rebuilt environments.
    Poll,
    /// Each render call checks the files before dispatching.
    OnDemand,
}

/// `[render]`: worker pool and deadline.
///
/// ```toml
/// [render]
/// workers = 6          # concurrent render workers
/// queue = 6            # pending-job bound (default: same as workers)
/// timeout_ms = 50      # per-render deadline
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub workers: usize,
    /// Bound on queued jobs; submissions beyond it are rejected, not
    /// queued. Defaults to the worker count.
    pub queue: Option<usize>,
    pub timeout_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            workers: 6,
            queue: None,
            timeout_ms: 50,
        }
    }
}

/// `[serve]`: demo HTTP host.
///
/// ```toml
/// [serve]
/// interface = "127.0.0.1"
/// port = 4801
/// component = "app"    # component rendered at /
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Component id served at the root path.
    pub component: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 4801,
            component: "app".to_owned(),
        }
    }
}
