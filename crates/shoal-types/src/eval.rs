//! Contract between the REPL and an expression evaluator.
//!
//! The REPL never looks inside expressions or values. It hands a line to
//! [`Evaluator::parse`], feeds the result through [`Evaluator::check`] and
//! [`Evaluator::eval`], and prints what comes back through the
//! [`DynamicValue`] and [`CheckedExpr`] views. Introspection commands
//! (`packages`, `method`, `whatis`) use [`Introspect`].

use std::fmt;

/// Name of the package holding top-level bindings.
pub const TOP_LEVEL: &str = ".";

/// A syntax error at a character position in the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 0-based character offset of the offending token.
    pub position: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    /// The source line and a caret line pointing at the error position.
    pub fn indicator(&self, source: &str) -> (String, String) {
        let width = source.chars().count();
        let column = self.position.min(width);
        (source.to_string(), format!("{}^", " ".repeat(column)))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position + 1, self.message)
    }
}

/// One diagnostic from type checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckError(pub String);

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A runtime failure during evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError(pub String);

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value produced by evaluation, as the REPL sees it.
pub trait DynamicValue {
    /// Dynamic kind, e.g. `int` or `slice`.
    fn kind_name(&self) -> String;

    /// Static type, e.g. `[]interface {}`.
    fn type_name(&self) -> String;

    /// Whether the value came from a constant expression.
    fn is_constant(&self) -> bool;

    /// Display form used after `results[n] =`.
    fn render(&self) -> String;
}

/// A type-checked expression, as the `whatis` command sees it.
pub trait CheckedExpr {
    /// Canonical source form of the expression.
    fn describe(&self) -> String;

    /// The folded constant value, if the expression is constant.
    fn constant(&self) -> Option<String>;

    /// Static result types; more than one for multi-valued calls.
    fn known_types(&self) -> Vec<String>;
}

/// Exported members of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub name: String,
    /// Import path.
    pub path: String,
    pub consts: Vec<String>,
    pub funcs: Vec<String>,
    pub types: Vec<String>,
    pub vars: Vec<String>,
}

/// Kind and full name of a named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Qualified type name, e.g. `strings.Builder`.
    pub name: String,
    /// Underlying kind, e.g. `struct`.
    pub kind: String,
}

/// Outcome of asking for the methods of a bound name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodLookup {
    /// The name is a variable; these are the methods of its type.
    Variable(Vec<String>),
    /// The name is a type; these are its methods.
    Type(Vec<String>),
    /// The name is a type whose method set was never recorded.
    NoMethodInfo,
    NoSuchPackage,
    NoSuchMember,
}

/// Read-only queries over an evaluation environment.
pub trait Introspect {
    /// Names of every imported package.
    fn package_names(&self) -> Vec<String>;

    fn package(&self, name: &str) -> Option<PackageInfo>;

    fn is_package(&self, name: &str) -> bool {
        self.package(name).is_some()
    }

    /// Look up a named type, in `package` or at top level when `None`.
    fn lookup_type(&self, package: Option<&str>, name: &str) -> Option<TypeInfo>;

    /// Methods exposed by a variable or type, in `package` or at top level.
    fn methods(&self, package: Option<&str>, name: &str) -> MethodLookup;
}

/// An expression evaluator that owns its environment.
pub trait Evaluator: Introspect {
    type Expr;
    type Checked: CheckedExpr;
    type Value: DynamicValue;

    fn parse(&self, source: &str) -> std::result::Result<Self::Expr, ParseError>;

    fn check(&self, expr: &Self::Expr) -> std::result::Result<Self::Checked, Vec<CheckError>>;

    /// Run a checked expression.
    ///
    /// `Ok(None)` means no value at all (e.g. `nil`); `Ok(Some(vec![]))`
    /// means a call that returns nothing.
    fn eval(
        &mut self,
        checked: &Self::Checked,
    ) -> std::result::Result<Option<Vec<Self::Value>>, EvalError>;

    /// Told about every result the REPL keeps, so expressions can refer
    /// back to `results[index]`.
    fn record_result(&mut self, _index: usize, _values: &[Self::Value]) {}
}
