//! Two-level commands.
//!
//! A parent command such as `set` owns a [`SubcommandSet`]. Any parent can
//! reuse the same dispatch, listing, and help logic; [`SubcommandManager`]
//! is the ready-made parent whose whole job is to dispatch.

use std::collections::HashMap;

use shoal_types::error::{Result, ShoalError};
use shoal_types::eval::Evaluator;

use crate::registry::{Command, Shell};
use crate::validate::{Arity, arg_count_ok};

/// A named action nested under a parent command.
pub trait Subcommand<E: Evaluator> {
    /// Name, unique within the parent.
    fn name(&self) -> &str;

    /// Long help shown by `help <parent> <name>`.
    fn help(&self) -> &str;

    /// One-line description shown when listing the parent's subcommands.
    fn short_help(&self) -> &str;

    /// Accepted argument counts after the subcommand word.
    fn arity(&self) -> Arity;

    /// Run the subcommand with the full `[parent, name, ...]` argument list.
    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>);
}

/// The subcommands of one parent command.
pub struct SubcommandSet<E: Evaluator> {
    parent: String,
    subcommands: HashMap<String, Box<dyn Subcommand<E>>>,
}

impl<E: Evaluator> SubcommandSet<E> {
    pub fn new(parent: &str) -> Self {
        Self {
            parent: parent.to_string(),
            subcommands: HashMap::new(),
        }
    }

    /// Name of the owning command.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Add a subcommand. A name already in the set is an error.
    pub fn insert(&mut self, sub: Box<dyn Subcommand<E>>) -> Result<()> {
        let name = sub.name().to_string();
        if self.subcommands.contains_key(&name) {
            return Err(ShoalError::Registry(format!(
                "subcommand '{} {name}' is already registered",
                self.parent
            )));
        }
        log::debug!("registered subcommand '{} {name}'", self.parent);
        self.subcommands.insert(name, sub);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Subcommand<E>> {
        self.subcommands.get(name).map(|s| s.as_ref())
    }

    /// Subcommand names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.subcommands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.subcommands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subcommands.is_empty()
    }

    /// Dispatch `[parent]` or `[parent, name, ...]`.
    ///
    /// A bare parent lists the subcommands. Otherwise the subcommand is
    /// looked up, its argument count checked with bounds shifted past the
    /// parent word, and run.
    pub fn dispatch(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let Some(&sub_name) = args.get(1) else {
            self.list(shell);
            return;
        };
        match self.get(sub_name) {
            Some(sub) => {
                if arg_count_ok(sub.arity().shifted(1), args, shell.state) {
                    log::debug!("dispatching subcommand '{} {sub_name}'", self.parent);
                    sub.execute(args, shell);
                }
            },
            None => {
                shell.state.errmsg(format!(
                    "Unknown \"{}\" subcommand \"{sub_name}\".",
                    self.parent
                ));
                shell.state.errmsg(format!("Try \"help {} *\".", self.parent));
            },
        }
    }

    /// List every subcommand with its short help.
    pub fn list(&self, shell: &mut Shell<'_, E>) {
        shell
            .state
            .section(format!("List of {} commands", self.parent));
        for name in self.names() {
            if let Some(sub) = self.get(&name) {
                shell
                    .state
                    .msg(format!("{name:<10} -- {}", sub.short_help()));
            }
        }
    }

    /// Help for `help <parent> [<name> | *]`.
    ///
    /// `args` is the help command's own argument list, so the subcommand
    /// word (if any) is `args[2]`.
    pub fn help(&self, parent_help: &str, args: &[&str], shell: &mut Shell<'_, E>) {
        match args.get(2).copied() {
            None => shell.state.msg(parent_help),
            Some("*") => {
                shell
                    .state
                    .section(format!("All {} subcommand names:", self.parent));
                shell.state.print_columns(&self.names(), "  ");
            },
            Some(what) => match self.get(what) {
                Some(sub) => shell.state.msg(sub.help()),
                None => shell.state.errmsg(format!(
                    "Can't find help for subcommand '{what}' in {}",
                    self.parent
                )),
            },
        }
    }
}

/// A parent command that only dispatches to its subcommands.
pub struct SubcommandManager {
    name: &'static str,
    help: &'static str,
    category: Option<&'static str>,
    arity: Arity,
}

impl SubcommandManager {
    pub const fn new(name: &'static str, help: &'static str, arity: Arity) -> Self {
        Self {
            name,
            help,
            category: None,
            arity,
        }
    }

    pub const fn in_category(mut self, category: &'static str) -> Self {
        self.category = Some(category);
        self
    }
}

impl<E: Evaluator> Command<E> for SubcommandManager {
    fn name(&self) -> &str {
        self.name
    }

    fn help(&self) -> &str {
        self.help
    }

    fn category(&self) -> Option<&str> {
        self.category
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>) {
        let registry = shell.registry;
        match registry.subcommands(self.name) {
            Some(set) => set.dispatch(args, shell),
            None => shell
                .state
                .errmsg(format!("Internal error: '{}' has no subcommands", self.name)),
        }
    }
}
