//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

/// Interactive shell for Go-flavoured expressions.
#[derive(Debug, Parser)]
#[command(name = "shoal", version, about)]
pub struct Cli {
    /// Configuration file [default: $HOME/.shoal.toml]
    #[arg(long, value_name = "PATH", env = "SHOAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Line width for column output; overrides the config file and COLUMNS
    #[arg(long, value_name = "N")]
    pub width: Option<usize>,

    /// Print errors and headings without terminal codes
    #[arg(long)]
    pub no_highlight: bool,

    /// Skip the introductory text
    #[arg(long)]
    pub no_banner: bool,

    /// Neither load nor save the history file
    #[arg(long)]
    pub no_history: bool,
}
