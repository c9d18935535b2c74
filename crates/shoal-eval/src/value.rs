//! Runtime values and their display forms.

use std::fmt;
use std::io::Write;

use shoal_types::eval::DynamicValue;

use crate::types::{Signature, Type};

/// Native implementation of a package function.
///
/// Arguments arrive already checked against the signature; the writer is
/// the evaluator's output stream (for `fmt.Println` and friends).
pub type NativeFn = fn(&[Value], &mut dyn Write) -> Result<Vec<Value>, String>;

/// A function value backed by native code.
#[derive(Clone)]
pub struct Builtin {
    /// Qualified name, e.g. `math.Sqrt`.
    pub name: String,
    pub sig: Signature,
    pub call: NativeFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({} {})", self.name, self.sig)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Counts describing the live environment, as seen through `env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSummary {
    pub packages: usize,
    pub vars: usize,
    pub results: usize,
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    /// An `error`; `None` is the nil error.
    Error(Option<String>),
    List(Vec<Value>),
    Func(Builtin),
    Env(EnvSummary),
}

impl Value {
    /// The dynamic type of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float64,
            Self::Str(_) => Type::String,
            Self::Bool(_) => Type::Bool,
            Self::Error(_) => Type::Error,
            Self::List(_) => Type::List,
            Self::Func(b) => Type::Func(Box::new(b.sig.clone())),
            Self::Env(_) => Type::Env,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float view; integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            Self::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Default formatting: strings unquoted, lists space-separated.
    pub fn plain(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Float(x) => format_float(*x),
            Self::Str(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Error(None) => "<nil>".to_string(),
            Self::Error(Some(msg)) => msg.clone(),
            Self::List(items) => {
                let items: Vec<String> = items.iter().map(Value::plain).collect();
                format!("[{}]", items.join(" "))
            },
            Self::Func(b) => format!("func {}", b.name),
            Self::Env(s) => format!(
                "{{Packages:{} Vars:{} Results:{}}}",
                s.packages, s.vars, s.results
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(&go_quote(s)),
            other => f.write_str(&other.plain()),
        }
    }
}

/// A value as handed to the REPL, remembering whether it was folded from a
/// constant expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Value,
    pub constant: bool,
}

impl DynamicValue for Evaluated {
    fn kind_name(&self) -> String {
        self.value.type_of().kind().to_string()
    }

    fn type_name(&self) -> String {
        self.value.type_of().to_string()
    }

    fn is_constant(&self) -> bool {
        self.constant
    }

    fn render(&self) -> String {
        self.value.to_string()
    }
}

/// Shortest float form, switching to exponent notation for very large or
/// very small magnitudes (`1e+21`, `1e-05`).
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let exponent = x.abs().log10().floor();
    if (-4.0..21.0).contains(&exponent) {
        return format!("{x}");
    }
    let sci = format!("{x:e}");
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        },
        None => sci,
    }
}

/// Double-quoted string literal with escapes for quotes, backslashes, and
/// control characters.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            },
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
