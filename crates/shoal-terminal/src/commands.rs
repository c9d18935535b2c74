//! Built-in commands for the shoal shell: the catalog, `help`, and `quit`.

use shoal_types::error::{Result, ShoalError};
use shoal_types::eval::Evaluator;

use crate::registry::{Command, CommandRegistry, Shell};
use crate::validate::Arity;

/// Register the whole built-in catalog into a registry.
///
/// Fails only if the catalog itself is inconsistent (a duplicate name, an
/// alias that cannot be bound, a subcommand without its parent).
pub fn register_builtins<E: Evaluator>(reg: &mut CommandRegistry<E>) -> Result<()> {
    reg.register(Box::new(HelpCmd))?;
    alias(reg, "?", "help")?;
    alias(reg, "h", "help")?;

    reg.register(Box::new(QuitCmd))?;
    alias(reg, "q", "quit")?;

    crate::env_commands::register_env_commands(reg)?;
    crate::settings_commands::register_settings_commands(reg)?;
    Ok(())
}

/// Bind an alias, treating refusal as a catalog defect.
pub(crate) fn alias<E: Evaluator>(
    reg: &mut CommandRegistry<E>,
    alias: &str,
    target: &str,
) -> Result<()> {
    if reg.add_alias(alias, target) {
        Ok(())
    } else {
        Err(ShoalError::Config(format!(
            "can't bind alias '{alias}' to '{target}'"
        )))
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

const HELP_HELP: &str = "\
help [command | category | categories | *]

To evaluate an expression, just type the expression.

If the first word of the line is a shell command, the command takes
precedence. For example, \"help\" is a shell command.

\"help *\" lists all command names and \"help categories\" lists the
command categories. Given a category, the commands in it are listed.
Given a command name, help for that command is shown; for commands with
subcommands, \"help set *\" lists them and \"help set width\" describes one.";

struct HelpCmd;

impl<E: Evaluator> Command<E> for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }

    fn help(&self) -> &str {
        HELP_HELP
    }

    fn category(&self) -> Option<&str> {
        Some("support")
    }

    fn arity(&self) -> Arity {
        Arity::new(0, 2)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let registry = shell.registry;
        let Some(&what) = args.get(1) else {
            shell.state.msg(HELP_HELP);
            return;
        };

        match what {
            "*" => shell
                .state
                .print_sorted("All command names", &registry.all_names()),
            "categories" => {
                let mut categories = registry.category_names();
                categories.sort();
                shell.state.section("Categories");
                for category in categories {
                    shell.state.msg(format!("  {category}"));
                }
            },
            _ => {
                if let Some(entry) = registry.resolve(what) {
                    let command = entry.command();
                    match entry.subcommands() {
                        Some(set) if args.len() > 2 => set.help(command.help(), args, shell),
                        _ => {
                            shell.state.msg(command.help());
                            if !entry.aliases().is_empty() {
                                shell
                                    .state
                                    .msg(format!("Aliases: {}", entry.aliases().join(", ")));
                            }
                        },
                    }
                } else if let Some(names) = registry.category(what).filter(|n| !n.is_empty()) {
                    shell.state.section(format!("Commands in class: {what}"));
                    shell.state.print_columns(names, "  ");
                } else {
                    shell.state.errmsg(format!("Can't find help for {what}"));
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// quit
// ---------------------------------------------------------------------------

const QUIT_HELP: &str = "\
quit [exit-code]

Leave the shell. If an exit code is given, the program exits with it;
otherwise it exits with 0 (normal termination).";

struct QuitCmd;

impl<E: Evaluator> Command<E> for QuitCmd {
    fn name(&self) -> &str {
        "quit"
    }

    fn help(&self) -> &str {
        QUIT_HELP
    }

    fn category(&self) -> Option<&str> {
        Some("support")
    }

    fn arity(&self) -> Arity {
        Arity::new(0, 1)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let code = match args.get(1) {
            None => 0,
            Some(arg) => match arg.parse::<i32>() {
                Ok(code) => code,
                Err(_) => {
                    shell
                        .state
                        .errmsg(format!("Expecting integer return code; got {arg}."));
                    return;
                },
            },
        };
        shell.state.msg("shoal: That's all folks...");
        shell.state.request_exit(code);
    }
}
