//! `set` and `show`: session settings (terminal highlight, line width).

use shoal_types::error::Result;
use shoal_types::eval::Evaluator;

use crate::registry::{CommandRegistry, Shell};
use crate::state::ReplState;
use crate::subcommand::{Subcommand, SubcommandManager};
use crate::validate::{Arity, get_int};

const SET_HELP: &str = "\
Modifies parts of the REPL environment.

Type \"set\" for a list of \"set\" subcommands and what they do.
Type \"help set *\" for just a list of \"set\" subcommands.";

const SHOW_HELP: &str = "\
Shows parts of the REPL environment.

Type \"show\" for a list of \"show\" subcommands and what they do.
Type \"help show *\" for just a list of \"show\" subcommands.";

/// Upper bound accepted by `set width`.
const MAX_WIDTH: i64 = 10_000;

/// Register `set` and `show` together with their subcommands.
pub fn register_settings_commands<E: Evaluator>(reg: &mut CommandRegistry<E>) -> Result<()> {
    reg.register_with_subcommands(Box::new(
        SubcommandManager::new("set", SET_HELP, Arity::new(0, 3)).in_category("support"),
    ))?;
    reg.register_with_subcommands(Box::new(
        SubcommandManager::new("show", SHOW_HELP, Arity::new(0, 3)).in_category("support"),
    ))?;

    reg.add_subcommand("set", Box::new(SetHighlight))?;
    reg.add_subcommand("set", Box::new(SetWidth))?;
    reg.add_subcommand("show", Box::new(ShowHighlight))?;
    reg.add_subcommand("show", Box::new(ShowWidth))?;
    Ok(())
}

/// A parsed on/off switch value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnOff {
    On,
    Off,
    Unknown,
}

pub(crate) fn parse_on_off(word: &str) -> OnOff {
    match word {
        "on" | "1" | "yes" => OnOff::On,
        "off" | "0" | "none" => OnOff::Off,
        _ => OnOff::Unknown,
    }
}

fn show_on_off(state: &mut ReplState, name: &str, on: bool) {
    let setting = if on { "on" } else { "off" };
    state.msg(format!("{name} is {setting}."));
}

fn show_width(state: &mut ReplState) {
    let width = state.line_width;
    state.msg(format!("Line width is {width}"));
}

// ---- set highlight ----

struct SetHighlight;

impl<E: Evaluator> Subcommand<E> for SetHighlight {
    fn name(&self) -> &str {
        "highlight"
    }

    fn help(&self) -> &str {
        "set highlight [on|off]\n\nSets whether terminal highlighting is to be used."
    }

    fn short_help(&self) -> &str {
        "use terminal highlight"
    }

    fn arity(&self) -> Arity {
        Arity::new(0, 1)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let word = args.get(2).copied().unwrap_or("on");
        let state = &mut *shell.state;
        match (parse_on_off(word), state.highlight) {
            (OnOff::On, true) => state.errmsg("Highlight is already on"),
            (OnOff::Off, false) => state.errmsg("Highlight is already off"),
            (OnOff::On, false) => {
                state.msg("Setting highlight on");
                state.highlight = true;
            },
            (OnOff::Off, true) => {
                state.msg("Setting highlight off");
                state.highlight = false;
            },
            (OnOff::Unknown, _) => {
                state.msg(format!("Expecting 'on' or 'off', got '{word}'; nothing done"));
            },
        }
    }
}

// ---- set width ----

struct SetWidth;

impl<E: Evaluator> Subcommand<E> for SetWidth {
    fn name(&self) -> &str {
        "width"
    }

    fn help(&self) -> &str {
        "set width num\n\nSets the line length the REPL thinks we have."
    }

    fn short_help(&self) -> &str {
        "set line width"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(1)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let Some(&arg) = args.get(2) else {
            return;
        };
        let Some(width) = get_int(arg, "line width", 0, Some(MAX_WIDTH), shell.state) else {
            return;
        };
        let Ok(width) = usize::try_from(width) else {
            return;
        };
        shell.state.line_width = width;
        log::debug!("line width set to {width}");
        show_width(shell.state);
    }
}

// ---- show highlight ----

struct ShowHighlight;

impl<E: Evaluator> Subcommand<E> for ShowHighlight {
    fn name(&self) -> &str {
        "highlight"
    }

    fn help(&self) -> &str {
        "show highlight\n\nShows whether terminal highlighting is used."
    }

    fn short_help(&self) -> &str {
        "show terminal highlight"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(0)
    }

    fn execute(&self, _args: &[&str], shell: &mut Shell<'_, E>) {
        let on = shell.state.highlight;
        show_on_off(shell.state, "highlight", on);
    }
}

// ---- show width ----

struct ShowWidth;

impl<E: Evaluator> Subcommand<E> for ShowWidth {
    fn name(&self) -> &str {
        "width"
    }

    fn help(&self) -> &str {
        "show width\n\nShows the line length the REPL thinks we have."
    }

    fn short_help(&self) -> &str {
        "show line width"
    }

    fn arity(&self) -> Arity {
        Arity::exactly(0)
    }

    fn execute(&self, _args: &[&str], shell: &mut Shell<'_, E>) {
        show_width(shell.state);
    }
}
