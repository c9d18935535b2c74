//! Commands that inspect the evaluation environment: `packages`, `method`,
//! and `whatis`.

use shoal_types::error::Result;
use shoal_types::eval::{CheckedExpr, Evaluator, MethodLookup, TOP_LEVEL};

use crate::commands::alias;
use crate::registry::{Command, CommandRegistry, Shell};
use crate::validate::Arity;

/// Register the environment-inspection commands and their aliases.
pub fn register_env_commands<E: Evaluator>(reg: &mut CommandRegistry<E>) -> Result<()> {
    reg.register(Box::new(PackagesCmd))?;
    for name in ["pkg", "pkgs", "package"] {
        alias(reg, name, "packages")?;
    }

    reg.register(Box::new(MethodCmd))?;
    alias(reg, "fn", "method")?;
    alias(reg, "func", "method")?;

    reg.register(Box::new(WhatisCmd))?;
    Ok(())
}

/// Split `pkg.name` at the first dot. A bare name is top level.
fn split_qualified(full: &str) -> (Option<&str>, &str) {
    match full.split_once('.') {
        Some((package, name)) => (Some(package), name),
        None => (None, full),
    }
}

// ---------------------------------------------------------------------------
// packages
// ---------------------------------------------------------------------------

const PACKAGES_HELP: &str = "\
packages [package]

Show information about imported packages.

If a package name is given, its constants, functions, types, and
variables are listed. Otherwise the imported package names are listed.";

struct PackagesCmd;

impl<E: Evaluator> Command<E> for PackagesCmd {
    fn name(&self) -> &str {
        "packages"
    }

    fn help(&self) -> &str {
        PACKAGES_HELP
    }

    fn category(&self) -> Option<&str> {
        Some("support")
    }

    fn arity(&self) -> Arity {
        Arity::new(0, 1)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let Some(&name) = args.get(1) else {
            let names = shell.eval.package_names();
            shell.state.print_sorted("All imported packages", &names);
            return;
        };
        let Some(pkg) = shell.eval.package(name) else {
            shell.state.errmsg(format!("Package {name} not imported"));
            return;
        };

        shell
            .state
            .section(format!("=== Package {name} (\"{}\"): ===", pkg.path));
        let groups = [
            ("Constants", &pkg.consts),
            ("Functions", &pkg.funcs),
            ("Types", &pkg.types),
            ("Variables", &pkg.vars),
        ];
        for (title, members) in groups {
            if !members.is_empty() {
                shell
                    .state
                    .print_sorted(&format!("{title} of {name}"), members);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// method
// ---------------------------------------------------------------------------

const METHOD_HELP: &str = "\
method [package.]name [[package.]name ...]

Show the methods of a type or of the value bound to a variable.

Without a package qualifier the name is looked up at top level.";

struct MethodCmd;

impl MethodCmd {
    fn show<E: Evaluator>(full: &str, shell: &mut Shell<'_, E>) {
        let (package, name) = split_qualified(full);
        match shell.eval.methods(package, name) {
            MethodLookup::Variable(methods) if methods.is_empty() => {
                shell
                    .state
                    .msg(format!("No methods found for variable {full}"));
            },
            MethodLookup::Variable(methods) => shell
                .state
                .print_sorted(&format!("Methods for variable {full}"), &methods),
            MethodLookup::Type(methods) if methods.is_empty() => {
                shell.state.msg(format!("No methods found for type {full}"));
            },
            MethodLookup::Type(methods) => shell
                .state
                .print_sorted(&format!("Methods for type {full}"), &methods),
            MethodLookup::NoMethodInfo => shell
                .state
                .errmsg(format!("Don't have method info recorded for type {full}")),
            MethodLookup::NoSuchPackage => shell.state.errmsg(format!(
                "Can't find package {}",
                package.unwrap_or(TOP_LEVEL)
            )),
            MethodLookup::NoSuchMember => shell.state.errmsg(format!(
                "Can't find member {name} in package {}",
                package.unwrap_or(TOP_LEVEL)
            )),
        }
    }
}

impl<E: Evaluator> Command<E> for MethodCmd {
    fn name(&self) -> &str {
        "method"
    }

    fn help(&self) -> &str {
        METHOD_HELP
    }

    fn category(&self) -> Option<&str> {
        Some("support")
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        for full in args.iter().skip(1) {
            Self::show(full, shell);
        }
    }
}

// ---------------------------------------------------------------------------
// whatis
// ---------------------------------------------------------------------------

const WHATIS_HELP: &str = "\
whatis expression

Shows the type checker information for an expression.

As special cases, a package name is confirmed as a package, and a type
name (optionally package-qualified) shows its kind and type.";

struct WhatisCmd;

impl WhatisCmd {
    /// Package and type names given as the single argument.
    ///
    /// Returns `true` if the name was reported and nothing else is needed.
    fn special_case<E: Evaluator>(arg: &str, shell: &mut Shell<'_, E>) -> bool {
        if shell.eval.is_package(arg) {
            shell.state.msg(format!("`{arg}' is a package"));
            return true;
        }
        match split_qualified(arg) {
            (None, name) => {
                if let Some(typ) = shell.eval.lookup_type(None, name) {
                    shell.state.msg(format!("{arg} is a type: {}", typ.name));
                    return true;
                }
            },
            (Some(package), name) => {
                if shell.eval.is_package(package)
                    && let Some(typ) = shell.eval.lookup_type(Some(package), name)
                {
                    shell.state.msg(format!("{arg} is a kind: {}", typ.kind));
                    shell.state.msg(format!("{arg} is a type: {}", typ.name));
                    return true;
                }
            },
        }
        false
    }
}

impl<E: Evaluator> Command<E> for WhatisCmd {
    fn name(&self) -> &str {
        "whatis"
    }

    fn help(&self) -> &str {
        WHATIS_HELP
    }

    fn category(&self) -> Option<&str> {
        Some("data")
    }

    fn arity(&self) -> Arity {
        Arity::at_least(0)
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        if let [_, arg] = args
            && Self::special_case(arg, shell)
        {
            return;
        }

        // The expression is the rest of the raw line, spacing preserved.
        let line = shell.state.current_line.clone();
        let word = args.first().copied().unwrap_or_default();
        let source = line.strip_prefix(word).unwrap_or(&line);

        let expr = match shell.eval.parse(source) {
            Ok(expr) => expr,
            Err(e) => {
                let (text, caret) = e.indicator(source);
                shell.state.msg(text);
                shell.state.msg(caret);
                shell.state.errmsg(format!("parse error: {e}"));
                return;
            },
        };
        let checked = match shell.eval.check(&expr) {
            Ok(checked) => checked,
            Err(errors) => {
                for error in errors {
                    shell.state.msg(error);
                }
                return;
            },
        };

        shell.state.section(checked.describe());
        if let Some(value) = checked.constant() {
            shell.state.msg(format!("constant:\t{value}"));
        }
        match checked.known_types().as_slice() {
            [only] => shell.state.msg(format!("type:\t{only}")),
            types => {
                for (i, typ) in types.iter().enumerate() {
                    shell.state.msg(format!("type[{i}]:\t{typ}"));
                }
            },
        }
    }
}
