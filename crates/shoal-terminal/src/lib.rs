//! Command shell and REPL driver.
//!
//! The shell is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name, optionally with aliases, a
//! category, and a set of subcommands. Each input line is either handled
//! by a command or passed through to the expression evaluator.

mod columnize;
mod commands;
mod env_commands;
mod processor;
mod registry;
mod repl;
mod settings_commands;
mod state;
mod subcommand;
mod validate;

#[cfg(test)]
mod test_utils;

/// Lay out names in columns that fit a line width.
pub use columnize::columnize;
/// Register the built-in command catalog into a registry.
pub use commands::register_builtins;
/// Decide whether a line is a command or an expression, and run commands.
pub use processor::{Disposition, process_line};
/// A single executable command, the context it runs in, and the registry.
pub use registry::{Command, CommandEntry, CommandRegistry, Shell};
/// Line acquisition and the read-eval-print loop.
pub use repl::{LineReader, ReadOutcome, Repl, ResultEntry, StdinReader};
/// Process-wide REPL state and output channel.
pub use state::ReplState;
/// Two-level commands such as `set width`.
pub use subcommand::{Subcommand, SubcommandManager, SubcommandSet};
/// Argument arity contracts.
pub use validate::{Arity, ArityViolation, arg_count_ok, get_int};
