//! Shared helpers for unit tests: a capturing output sink, a scripted
//! evaluator, and configurable commands that record their invocations.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use shoal_types::eval::{
    CheckError, CheckedExpr, DynamicValue, EvalError, Evaluator, Introspect, MethodLookup,
    PackageInfo, ParseError, TOP_LEVEL, TypeInfo,
};

use crate::registry::{Command, Shell};
use crate::state::ReplState;
use crate::subcommand::Subcommand;
use crate::validate::Arity;

/// Output sink whose contents can be read back after the writer is boxed.
#[derive(Clone, Default)]
pub struct Capture(Rc<RefCell<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A width-80, unhighlighted state writing into a capture buffer.
pub fn capture_state() -> (ReplState, Capture) {
    let out = Capture::default();
    (ReplState::with_sink(Box::new(out.clone()), 80, false), out)
}

/// Command that records `"<name> <args...>"` into `StubEval::ran`.
pub struct NamedCmd {
    name: String,
    arity: Arity,
    category: Option<String>,
}

impl NamedCmd {
    pub fn new(name: &str, arity: Arity) -> Self {
        Self {
            name: name.to_string(),
            arity,
            category: None,
        }
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

impl Command<StubEval> for NamedCmd {
    fn name(&self) -> &str {
        &self.name
    }
    fn help(&self) -> &str {
        "a recording command"
    }
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
    fn arity(&self) -> Arity {
        self.arity
    }
    fn execute(&self, args: &[&str], shell: &mut Shell<'_, StubEval>) {
        shell.eval.ran.push(format!("{} {}", self.name, args.join(" ")));
    }
}

/// Subcommand that records `"<name> <args...>"` into `StubEval::ran`.
pub struct NamedSub {
    name: String,
    arity: Arity,
    short: String,
    help: String,
}

impl NamedSub {
    pub fn new(name: &str, arity: Arity) -> Self {
        Self {
            name: name.to_string(),
            arity,
            short: String::new(),
            help: format!("help for {name}"),
        }
    }

    pub fn short(mut self, short: &str) -> Self {
        self.short = short.to_string();
        self
    }
}

impl Subcommand<StubEval> for NamedSub {
    fn name(&self) -> &str {
        &self.name
    }
    fn help(&self) -> &str {
        &self.help
    }
    fn short_help(&self) -> &str {
        &self.short
    }
    fn arity(&self) -> Arity {
        self.arity
    }
    fn execute(&self, args: &[&str], shell: &mut Shell<'_, StubEval>) {
        shell.eval.ran.push(format!("{} {}", self.name, args.join(" ")));
    }
}

/// Scripted evaluator.
///
/// - empty input or `@` anywhere: parse error
/// - anything containing `undefined`: two check errors
/// - `nil`: no value; `void`: empty sequence; `boom`: eval error
/// - `pair`: an int and a string
/// - integers are ints, everything else is a string
#[derive(Default)]
pub struct StubEval {
    /// Commands and subcommands run, as recorded by `NamedCmd`/`NamedSub`.
    pub ran: Vec<String>,
    /// Every source line handed to `parse`.
    pub forwarded: RefCell<Vec<String>>,
    /// `(index, value count)` for every recorded result.
    pub recorded: Vec<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StubValue {
    kind: &'static str,
    type_name: &'static str,
    text: String,
}

impl StubValue {
    fn int(n: i64) -> Self {
        Self {
            kind: "int",
            type_name: "int",
            text: n.to_string(),
        }
    }

    fn string(s: &str) -> Self {
        Self {
            kind: "string",
            type_name: "string",
            text: format!("{s:?}"),
        }
    }

    fn list(items: &str) -> Self {
        Self {
            kind: "slice",
            type_name: "[]interface {}",
            text: items.to_string(),
        }
    }
}

impl DynamicValue for StubValue {
    fn kind_name(&self) -> String {
        self.kind.to_string()
    }
    fn type_name(&self) -> String {
        self.type_name.to_string()
    }
    fn is_constant(&self) -> bool {
        self.kind == "int"
    }
    fn render(&self) -> String {
        self.text.clone()
    }
}

pub struct StubChecked(String);

impl CheckedExpr for StubChecked {
    fn describe(&self) -> String {
        self.0.clone()
    }
    fn constant(&self) -> Option<String> {
        self.0.parse::<i64>().ok().map(|n| n.to_string())
    }
    fn known_types(&self) -> Vec<String> {
        if self.0 == "pair" {
            vec!["int".into(), "string".into()]
        } else if self.0.parse::<i64>().is_ok() {
            vec!["int".into()]
        } else {
            vec!["string".into()]
        }
    }
}

impl Introspect for StubEval {
    fn package_names(&self) -> Vec<String> {
        vec!["strings".into(), "fmt".into(), "math".into()]
    }

    fn package(&self, name: &str) -> Option<PackageInfo> {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        match name {
            "math" => Some(PackageInfo {
                name: "math".into(),
                path: "math".into(),
                consts: names(&["Pi", "E"]),
                funcs: names(&["Sqrt", "Abs"]),
                ..PackageInfo::default()
            }),
            "strings" => Some(PackageInfo {
                name: "strings".into(),
                path: "strings".into(),
                funcs: names(&["ToUpper"]),
                types: names(&["Builder"]),
                ..PackageInfo::default()
            }),
            "fmt" => Some(PackageInfo {
                name: "fmt".into(),
                path: "fmt".into(),
                funcs: names(&["Println"]),
                types: names(&["State"]),
                ..PackageInfo::default()
            }),
            _ => None,
        }
    }

    fn lookup_type(&self, package: Option<&str>, name: &str) -> Option<TypeInfo> {
        match (package.unwrap_or(TOP_LEVEL), name) {
            (TOP_LEVEL, "int") => Some(TypeInfo {
                name: "int".into(),
                kind: "int".into(),
            }),
            ("strings", "Builder") => Some(TypeInfo {
                name: "strings.Builder".into(),
                kind: "struct".into(),
            }),
            _ => None,
        }
    }

    fn methods(&self, package: Option<&str>, name: &str) -> MethodLookup {
        match (package.unwrap_or(TOP_LEVEL), name) {
            (TOP_LEVEL, "buf") => MethodLookup::Variable(vec!["String".into(), "Len".into()]),
            (TOP_LEVEL, "counter") => MethodLookup::Variable(Vec::new()),
            (TOP_LEVEL, "int") => MethodLookup::Type(Vec::new()),
            ("strings", "Builder") => MethodLookup::Type(vec![
                "WriteString".into(),
                "Len".into(),
                "String".into(),
            ]),
            ("fmt", "State") => MethodLookup::NoMethodInfo,
            (TOP_LEVEL | "strings" | "fmt" | "math", _) => MethodLookup::NoSuchMember,
            _ => MethodLookup::NoSuchPackage,
        }
    }
}

impl Evaluator for StubEval {
    type Expr = String;
    type Checked = StubChecked;
    type Value = StubValue;

    fn parse(&self, source: &str) -> Result<String, ParseError> {
        self.forwarded.borrow_mut().push(source.to_string());
        if source.trim().is_empty() {
            return Err(ParseError::new(0, "expected operand"));
        }
        if let Some(pos) = source.find('@') {
            return Err(ParseError::new(pos, "illegal character U+0040 '@'"));
        }
        Ok(source.trim().to_string())
    }

    fn check(&self, expr: &String) -> Result<StubChecked, Vec<CheckError>> {
        if expr.contains("undefined") {
            return Err(vec![
                CheckError("undefined: undefined".into()),
                CheckError("invalid operation".into()),
            ]);
        }
        Ok(StubChecked(expr.clone()))
    }

    fn eval(&mut self, checked: &StubChecked) -> Result<Option<Vec<StubValue>>, EvalError> {
        let src = checked.0.as_str();
        match src {
            "nil" => Ok(None),
            "void" => Ok(Some(Vec::new())),
            "boom" => Err(EvalError("division by zero".into())),
            "pair" => Ok(Some(vec![StubValue::int(1), StubValue::string("a")])),
            "list" => Ok(Some(vec![StubValue::list("[1 2]")])),
            _ => match src.parse::<i64>() {
                Ok(n) => Ok(Some(vec![StubValue::int(n)])),
                Err(_) => Ok(Some(vec![StubValue::string(src)])),
            },
        }
    }

    fn record_result(&mut self, index: usize, values: &[StubValue]) {
        self.recorded.push((index, values.len()));
    }
}
