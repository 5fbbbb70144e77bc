//! `sprig render`: one-shot render of a single component.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::RendererConfig;
use crate::engine::EnvironmentBuilder;
use crate::metrics::LogSink;
use crate::reload::Reloading;
use crate::render::{ComponentState, RenderScheduler};

pub fn run(config: &RendererConfig, id: &str, data: String, location: String) -> Result<()> {
    let component = config
        .component(id)
        .with_context(|| format!("unknown component `{id}`"))?;

    let files = config.source_files();
    let builder = EnvironmentBuilder::new(files.clone());
    let source = Arc::new(Reloading::new(files, move || {
        builder.build().map_err(Into::into)
    }));

    // Force the first load here so broken sources fail loudly instead of
    // degrading to a blank render.
    source.current()?;

    let scheduler = RenderScheduler::new(
        source,
        Arc::new(LogSink),
        config.render.workers,
        config.queue_capacity(),
        config.render_timeout(),
    );

    let html = scheduler
        .render(&component, &ComponentState::new(data, location))
        .wait();
    println!("{html}");

    scheduler.shutdown_now();
    Ok(())
}
