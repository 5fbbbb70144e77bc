//! `sprig check`: build the environment once and report what broke.

use anyhow::{Context, Result};

use crate::config::RendererConfig;
use crate::engine::EnvironmentBuilder;
use crate::log;
use crate::render::Component;

/// Build from the configured sources, then compile every configured
/// component expression against the result.
pub fn run(config: &RendererConfig) -> Result<()> {
    let files = config.source_files();
    let env = EnvironmentBuilder::new(files.clone())
        .build()
        .context("environment build failed")?;

    for (id, expr) in &config.components {
        env.compile_component(&Component::new(id.clone(), expr.clone()))
            .with_context(|| format!("component `{id}` does not compile"))?;
    }

    log!(
        "check";
        "ok: {} files, {} components (environment #{})",
        files.len(),
        config.components.len(),
        env.generation()
    );
    Ok(())
}
