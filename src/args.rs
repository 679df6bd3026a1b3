//! This module defines the command line arguments Evently accepts.

use std::path::PathBuf;
use termcolor::ColorChoice;


#[derive(Debug, clap::Parser)]
#[command(about = "GraphQL backend for a small event booking service.")]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) cmd: Command,

    /// Whether to use colors when printing to the terminal.
    #[arg(long, global = true, value_enum, default_value_t = ColorArg::Auto)]
    pub(crate) color: ColorArg,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    /// Starts the backend HTTP/GraphQL server.
    Serve {
        #[command(flatten)]
        shared: Shared,
    },

    /// Checks config and store connection to find problems in Evently's
    /// environment.
    ///
    /// Useful to catch errors early, without needing to restart a running
    /// Evently process. Exits with 0 if everything is Ok, and with 1
    /// otherwise.
    Check {
        #[command(flatten)]
        shared: Shared,
    },

    /// Outputs a template for the configuration file (which includes
    /// descriptions of all options).
    WriteConfig {
        /// Target file. If not specified, the template is written to stdout.
        target: Option<PathBuf>,
    },

    /// Exports the API as GraphQL schema (SDL).
    ExportApiSchema,
}

#[derive(Debug, clap::Args)]
pub(crate) struct Shared {
    /// Path to the configuration file. If this is not specified, Evently will
    /// try opening `config.toml` or `/etc/evently/config.toml`.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum ColorArg {
    Auto,
    Always,
    Never,
}

impl Args {
    pub(crate) fn color_choice(&self) -> ColorChoice {
        match self.color {
            ColorArg::Auto => ColorChoice::Auto,
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        }
    }
}
