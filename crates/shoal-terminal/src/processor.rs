//! Per-line command processing.

use shoal_types::eval::Evaluator;

use crate::registry::Shell;
use crate::validate::arg_count_ok;

/// What became of an input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Handled here: blank, a comment, or a command (whether or not its
    /// arguments were accepted).
    Consumed,
    /// Not a command; belongs to the expression evaluator.
    PassThrough,
}

/// Decide what `line` is and run it if it names a command.
///
/// The trimmed line is stored as the REPL's current line. Blank lines and
/// `//` comments are consumed without running anything. If the first word
/// resolves (directly or through an alias) to a registered command, its
/// argument count is validated and the command run; the line is consumed
/// either way. Anything else passes through untouched.
pub fn process_line<E: Evaluator>(line: &str, shell: &mut Shell<'_, E>) -> Disposition {
    let trimmed = line.trim();
    shell.state.current_line = trimmed.to_string();

    if trimmed.starts_with("//") {
        shell.state.msg(line);
        return Disposition::Consumed;
    }

    let args: Vec<&str> = trimmed.split_whitespace().collect();
    let Some(&word) = args.first() else {
        shell.state.msg("Empty line skipped");
        return Disposition::Consumed;
    };

    let registry = shell.registry;
    let Some(entry) = registry.resolve(word) else {
        return Disposition::PassThrough;
    };

    let command = entry.command();
    log::debug!("line dispatched to command '{}'", command.name());
    if arg_count_ok(command.arity(), &args, shell.state) {
        command.execute(&args, shell);
    }
    Disposition::Consumed
}
