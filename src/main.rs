//! Sprig - a hot-reloading script renderer for server-side UI components.

use anyhow::Result;
use clap::{ColorChoice, Parser};

use sprig::cli::{self, Cli, Commands};
use sprig::config::RendererConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    sprig::logger::set_verbose(cli.verbose);

    let config = RendererConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { interface, port } => cli::serve::run(&config, interface, port),
        Commands::Render {
            component,
            data,
            location,
        } => cli::render::run(&config, &component, data, location),
        Commands::Check => cli::check::run(&config),
    }
}
