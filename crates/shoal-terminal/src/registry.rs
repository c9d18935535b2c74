//! Command trait, the command registry, and the context commands run in.
//!
//! The registry owns three tables: commands by name, aliases to canonical
//! names, and categories to the commands filed under them. It is filled in
//! once at startup and only read while the loop runs.

use std::collections::HashMap;

use shoal_types::error::{Result, ShoalError};
use shoal_types::eval::Evaluator;

use crate::state::ReplState;
use crate::subcommand::{Subcommand, SubcommandSet};
use crate::validate::Arity;

/// Everything a command may touch while it runs.
pub struct Shell<'a, E: Evaluator> {
    /// The registry the command was dispatched from.
    pub registry: &'a CommandRegistry<E>,
    pub state: &'a mut ReplState,
    /// The evaluator and the environment it owns.
    pub eval: &'a mut E,
}

/// A single executable top-level command.
pub trait Command<E: Evaluator> {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// Long help shown by `help <name>`.
    fn help(&self) -> &str;

    /// Category for `help <category>` listings.
    fn category(&self) -> Option<&str> {
        None
    }

    /// Accepted argument counts, excluding the command word.
    fn arity(&self) -> Arity;

    /// Run the command. `args[0]` is the command word as typed.
    fn execute(&self, args: &[&str], shell: &mut Shell<'_, E>);
}

/// A registered command with its aliases and optional subcommands.
pub struct CommandEntry<E: Evaluator> {
    command: Box<dyn Command<E>>,
    aliases: Vec<String>,
    subcommands: Option<SubcommandSet<E>>,
}

impl<E: Evaluator> CommandEntry<E> {
    pub fn command(&self) -> &dyn Command<E> {
        self.command.as_ref()
    }

    /// Aliases in the order they were added.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Present only for commands that host subcommands.
    pub fn subcommands(&self) -> Option<&SubcommandSet<E>> {
        self.subcommands.as_ref()
    }
}

/// Registry of available commands.
pub struct CommandRegistry<E: Evaluator> {
    commands: HashMap<String, CommandEntry<E>>,
    aliases: HashMap<String, String>,
    categories: HashMap<String, Vec<String>>,
}

impl<E: Evaluator> CommandRegistry<E> {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
            categories: HashMap::new(),
        }
    }

    /// Register a command. A name that is already taken is an error.
    ///
    /// A command that declares a category is filed under it.
    pub fn register(&mut self, cmd: Box<dyn Command<E>>) -> Result<()> {
        self.insert(cmd, None)
    }

    /// Register a command that hosts subcommands, with an empty set.
    pub fn register_with_subcommands(&mut self, cmd: Box<dyn Command<E>>) -> Result<()> {
        let set = SubcommandSet::new(cmd.name());
        self.insert(cmd, Some(set))
    }

    fn insert(
        &mut self,
        cmd: Box<dyn Command<E>>,
        subcommands: Option<SubcommandSet<E>>,
    ) -> Result<()> {
        let name = cmd.name().to_string();
        if self.commands.contains_key(&name) {
            return Err(ShoalError::Registry(format!(
                "command '{name}' is already registered"
            )));
        }
        if self.aliases.contains_key(&name) {
            return Err(ShoalError::Registry(format!(
                "command '{name}' collides with an alias"
            )));
        }
        if let Some(category) = cmd.category() {
            let category = category.to_string();
            self.add_to_category(&category, &name);
        }
        log::debug!("registered command '{name}'");
        self.commands.insert(
            name,
            CommandEntry {
                command: cmd,
                aliases: Vec::new(),
                subcommands,
            },
        );
        Ok(())
    }

    /// Swap in a new implementation for an existing command.
    ///
    /// Aliases and subcommands stay attached to the name; the category
    /// index is not touched.
    pub fn replace(&mut self, cmd: Box<dyn Command<E>>) -> Result<()> {
        match self.commands.get_mut(cmd.name()) {
            Some(entry) => {
                log::debug!("replaced command '{}'", cmd.name());
                entry.command = cmd;
                Ok(())
            },
            None => Err(ShoalError::Registry(format!(
                "cannot replace unknown command '{}'",
                cmd.name()
            ))),
        }
    }

    /// Bind `alias` to the command `target`.
    ///
    /// Returns `false` and changes nothing if the alias is already bound,
    /// shadows a command name, or the target is not registered.
    pub fn add_alias(&mut self, alias: &str, target: &str) -> bool {
        if let Some(existing) = self.aliases.get(alias) {
            log::warn!("alias '{alias}' already bound to '{existing}'");
            return false;
        }
        if self.commands.contains_key(alias) {
            log::warn!("alias '{alias}' would shadow a command");
            return false;
        }
        let Some(entry) = self.commands.get_mut(target) else {
            log::warn!("alias '{alias}' targets unknown command '{target}'");
            return false;
        };
        entry.aliases.push(alias.to_string());
        self.aliases.insert(alias.to_string(), target.to_string());
        true
    }

    /// File `name` under `category`. Duplicates are kept.
    pub fn add_to_category(&mut self, category: &str, name: &str) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(name.to_string());
    }

    /// Canonical command name for a command name or alias.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.commands.get_key_value(name) {
            return Some(key.as_str());
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// The entry for a canonical command name.
    pub fn get(&self, name: &str) -> Option<&CommandEntry<E>> {
        self.commands.get(name)
    }

    /// The entry for a command name or alias.
    pub fn resolve(&self, name: &str) -> Option<&CommandEntry<E>> {
        self.lookup(name).and_then(|canonical| self.commands.get(canonical))
    }

    /// Registered command names, in no particular order.
    pub fn all_names(&self) -> Vec<String> {
        self.commands.keys().cloned().collect()
    }

    /// Category names, in no particular order.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Commands filed under `category`, in registration order.
    pub fn category(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Add a subcommand under `parent`.
    ///
    /// An unknown parent, or one registered without a subcommand set, is a
    /// defect in the command catalog and reported as a config error.
    pub fn add_subcommand(&mut self, parent: &str, sub: Box<dyn Subcommand<E>>) -> Result<()> {
        let Some(entry) = self.commands.get_mut(parent) else {
            return Err(ShoalError::Config(format!(
                "can't find command '{parent}' to add subcommand '{}' to",
                sub.name()
            )));
        };
        let Some(set) = entry.subcommands.as_mut() else {
            return Err(ShoalError::Config(format!(
                "command '{parent}' does not take subcommands (adding '{}')",
                sub.name()
            )));
        };
        set.insert(sub)
    }

    /// The subcommand set of a command name or alias.
    pub fn subcommands(&self, parent: &str) -> Option<&SubcommandSet<E>> {
        self.resolve(parent).and_then(CommandEntry::subcommands)
    }
}

impl<E: Evaluator> Default for CommandRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
