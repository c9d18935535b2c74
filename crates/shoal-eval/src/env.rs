//! The evaluation environment: packages, the top-level scope, user
//! variables, and kept results.
//!
//! `env` and `results` are not stored as bindings. Name resolution
//! synthesises them from the live state, so the environment never holds a
//! reference to itself.

use std::collections::BTreeMap;

use crate::packages::{Package, TypeDef, standard_packages, universe};
use crate::types::Type;
use crate::value::{Builtin, EnvSummary, Value};

/// Name of the read-only view of the environment.
pub const ENV_NAME: &str = "env";
/// Name of the list of kept results.
pub const RESULTS_NAME: &str = "results";

/// A variable: its value and its static type.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub value: Value,
    pub ty: Type,
}

/// What an identifier refers to.
#[derive(Debug, Clone)]
pub enum Name<'a> {
    Var(Binding),
    /// `true` or `false`.
    Const(Value),
    Nil,
    Func(&'a Builtin),
    Type(&'a TypeDef),
    Package(&'a Package),
}

pub struct Environment {
    universe: Package,
    packages: BTreeMap<String, Package>,
    vars: BTreeMap<String, Binding>,
    results: Vec<Value>,
}

impl Environment {
    /// An environment with every standard package imported.
    pub fn new() -> Self {
        let packages: BTreeMap<String, Package> = standard_packages()
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        log::debug!("environment created with {} packages", packages.len());
        Self {
            universe: universe(),
            packages,
            vars: BTreeMap::new(),
            results: Vec::new(),
        }
    }

    /// The top-level scope.
    pub fn universe(&self) -> &Package {
        &self.universe
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Imported package names, sorted.
    pub fn package_names(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    /// A variable by name, including the synthesised `env` and `results`.
    pub fn var(&self, name: &str) -> Option<Binding> {
        if let Some(binding) = self.vars.get(name) {
            return Some(binding.clone());
        }
        match name {
            ENV_NAME => Some(Binding {
                value: Value::Env(self.summary()),
                ty: Type::Env,
            }),
            RESULTS_NAME => Some(Binding {
                value: Value::List(self.results.clone()),
                ty: Type::List,
            }),
            _ => None,
        }
    }

    /// Resolve an identifier: variables, then predeclared names, then the
    /// top-level scope, then packages.
    pub fn resolve(&self, name: &str) -> Option<Name<'_>> {
        if let Some(binding) = self.var(name) {
            return Some(Name::Var(binding));
        }
        match name {
            "true" => return Some(Name::Const(Value::Bool(true))),
            "false" => return Some(Name::Const(Value::Bool(false))),
            "nil" => return Some(Name::Nil),
            _ => {},
        }
        if let Some(func) = self.universe.funcs.get(name) {
            return Some(Name::Func(func));
        }
        if let Some(def) = self.universe.types.get(name) {
            return Some(Name::Type(def));
        }
        self.packages.get(name).map(Name::Package)
    }

    /// Bind or rebind a user variable.
    pub fn define(&mut self, name: &str, binding: Binding) -> Result<(), String> {
        if is_reserved(name) {
            return Err(format!("cannot assign to {name} (read-only)"));
        }
        log::debug!("binding {name} as {}", binding.ty);
        self.vars.insert(name.to_string(), binding);
        Ok(())
    }

    /// User variable names, sorted.
    pub fn var_names(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }

    /// Keep a result so later expressions can read `results[index]`.
    pub fn record_result(&mut self, index: usize, value: Value) {
        if index != self.results.len() {
            log::warn!(
                "result index {index} does not follow the {} kept results",
                self.results.len()
            );
        }
        self.results.push(value);
    }

    pub fn results(&self) -> &[Value] {
        &self.results
    }

    pub fn summary(&self) -> EnvSummary {
        EnvSummary {
            packages: self.packages.len(),
            vars: self.vars.len(),
            results: self.results.len(),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Names that user code may read but not rebind.
pub fn is_reserved(name: &str) -> bool {
    matches!(name, ENV_NAME | RESULTS_NAME)
}
