//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Sprig script renderer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (default: sprig.toml)
    #[arg(short = 'C', long, default_value = "sprig.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve components over HTTP with hot reload
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Render one component to stdout
    #[command(visible_alias = "r")]
    Render {
        /// Component id from [components]
        component: String,

        /// Pre-serialized JSON payload passed to the script as `props`
        #[arg(short, long, default_value = "{}")]
        data: String,

        /// Location string passed to the script as `location`
        #[arg(short, long, default_value = "/")]
        location: String,
    },

    /// Build the environment once and report load errors
    #[command(visible_alias = "c")]
    Check,
}
