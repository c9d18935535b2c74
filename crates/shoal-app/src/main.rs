//! shoal entry point.
//!
//! Loads the configuration, wires the built-in evaluator into the command
//! shell, and runs the REPL over a rustyline reader. The process exits with
//! the code given to `quit` (0 at end of input).

mod cli;
mod reader;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use reader::{HistoryFile, RustylineReader};
use shoal_eval::Interpreter;
use shoal_terminal::{CommandRegistry, Repl, ReplState, register_builtins};
use shoal_types::config::ShellConfig;

/// Config file looked up in `$HOME` when `--config` is not given.
const CONFIG_FILE: &str = ".shoal.toml";

const BANNER: &str = "\
=== shoal: an interactive Go expression shell ===

Results of expressions are stored in the list \"results\".
The environment is reachable as \"env\".

Enter expressions to be evaluated at the prompt.
Type \"help\" for the list of commands.

To see all results, type: \"results\".

To quit, enter: \"quit\" or Ctrl-D (EOF).";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let config = load_config(cli.config.as_deref(), home.as_deref())?;

    let columns = std::env::var("COLUMNS").ok();
    let width = config.resolve_width(cli.width, columns.as_deref());
    let highlight = config.highlight && !cli.no_highlight;
    log::info!("starting shoal (width {width}, highlight {highlight})");

    let mut state = ReplState::new(width, highlight);
    if config.banner && !cli.no_banner {
        state.msg(BANNER);
    }

    let history = if cli.no_history {
        None
    } else {
        match HistoryFile::at(config.history_path(home.as_deref())) {
            HistoryFile::Enabled(path) => Some(path),
            HistoryFile::Disabled(reason) => {
                state.msg(reason);
                None
            },
        }
    };
    let mut reader = RustylineReader::new(history, config.history_size)?;

    let mut registry = CommandRegistry::<Interpreter>::new();
    register_builtins(&mut registry)?;
    log::debug!("{} commands registered", registry.all_names().len());

    let mut repl = Repl::new(registry, state, Interpreter::new()).with_prompt(config.prompt);
    let outcome = repl.run(&mut reader);
    reader.save_history();
    let code = outcome?;

    log::info!("shoal exiting with code {code}");
    std::process::exit(code)
}

/// Load `explicit`, or `$HOME/.shoal.toml`, or fall back to the defaults.
fn load_config(explicit: Option<&Path>, home: Option<&Path>) -> Result<ShellConfig> {
    let path = match (explicit, home) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(home)) => home.join(CONFIG_FILE),
        (None, None) => return Ok(ShellConfig::default()),
    };
    Ok(ShellConfig::load(&path)?)
}
