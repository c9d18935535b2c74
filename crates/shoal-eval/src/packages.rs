//! The packages available to expressions, and the top-level scope.

use std::collections::BTreeMap;
use std::io::Write;

use shoal_types::eval::{PackageInfo, TOP_LEVEL};

use crate::env::Binding;
use crate::types::{Signature, Type};
use crate::value::{Builtin, NativeFn, Value, go_quote};

/// A named type a package exports.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDef {
    /// Qualified name, e.g. `strings.Builder`.
    pub name: String,
    pub kind: &'static str,
    /// The value type, for types usable in conversions (`int(x)`).
    pub value_type: Option<Type>,
    /// `None` when no method information is recorded.
    pub methods: Option<Vec<String>>,
}

/// One member of a package, as found by [`Package::member`].
#[derive(Debug, Clone, Copy)]
pub enum Member<'a> {
    Const(&'a Value),
    Func(&'a Builtin),
    Var(&'a Binding),
    Type(&'a TypeDef),
}

/// An importable package.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: String,
    pub path: String,
    pub consts: BTreeMap<String, Value>,
    pub funcs: BTreeMap<String, Builtin>,
    pub types: BTreeMap<String, TypeDef>,
    pub vars: BTreeMap<String, Binding>,
}

impl Package {
    /// An empty package; its name is the last segment of `path`.
    pub fn new(path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path);
        Self {
            name: name.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    fn qualify(&self, member: &str) -> String {
        if self.name == TOP_LEVEL {
            member.to_string()
        } else {
            format!("{}.{member}", self.name)
        }
    }

    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.consts.insert(name.to_string(), value);
        self
    }

    pub fn func(mut self, name: &str, sig: Signature, call: NativeFn) -> Self {
        let builtin = Builtin {
            name: self.qualify(name),
            sig,
            call,
        };
        self.funcs.insert(name.to_string(), builtin);
        self
    }

    pub fn type_def(
        mut self,
        name: &str,
        kind: &'static str,
        value_type: Option<Type>,
        methods: Option<&[&str]>,
    ) -> Self {
        let def = TypeDef {
            name: self.qualify(name),
            kind,
            value_type,
            methods: methods.map(|m| m.iter().map(|s| s.to_string()).collect()),
        };
        self.types.insert(name.to_string(), def);
        self
    }

    pub fn var(mut self, name: &str, value: Value) -> Self {
        let ty = value.type_of();
        self.vars.insert(name.to_string(), Binding { value, ty });
        self
    }

    pub fn member(&self, name: &str) -> Option<Member<'_>> {
        if let Some(value) = self.consts.get(name) {
            return Some(Member::Const(value));
        }
        if let Some(func) = self.funcs.get(name) {
            return Some(Member::Func(func));
        }
        if let Some(binding) = self.vars.get(name) {
            return Some(Member::Var(binding));
        }
        self.types.get(name).map(Member::Type)
    }

    /// Member names for introspection commands.
    pub fn info(&self) -> PackageInfo {
        let keys = |names: Vec<&String>| names.into_iter().cloned().collect::<Vec<_>>();
        PackageInfo {
            name: self.name.clone(),
            path: self.path.clone(),
            consts: keys(self.consts.keys().collect()),
            funcs: keys(self.funcs.keys().collect()),
            types: keys(self.types.keys().collect()),
            vars: keys(self.vars.keys().collect()),
        }
    }
}

fn sig(params: Vec<Type>, results: Vec<Type>) -> Signature {
    Signature {
        params,
        variadic: None,
        results,
    }
}

fn variadic_sig(rest: Type, results: Vec<Type>) -> Signature {
    Signature {
        params: Vec::new(),
        variadic: Some(rest),
        results,
    }
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn float_arg(args: &[Value], i: usize) -> Result<f64, String> {
    args.get(i)
        .and_then(Value::as_float)
        .ok_or_else(|| format!("argument {} is not a number", i + 1))
}

fn int_arg(args: &[Value], i: usize) -> Result<i64, String> {
    args.get(i)
        .and_then(Value::as_int)
        .ok_or_else(|| format!("argument {} is not an int", i + 1))
}

fn str_arg(args: &[Value], i: usize) -> Result<&str, String> {
    args.get(i)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("argument {} is not a string", i + 1))
}

fn one(value: Value) -> Result<Vec<Value>, String> {
    Ok(vec![value])
}

fn str_list<'a>(items: impl Iterator<Item = &'a str>) -> Value {
    Value::List(items.map(|s| Value::Str(s.to_string())).collect())
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

/// The top-level scope: the `len` builtin and the basic types.
pub fn universe() -> Package {
    Package::new(TOP_LEVEL)
        .func("len", sig(vec![Type::Any], vec![Type::Int]), |args, _| {
            let n = match args.first() {
                Some(Value::Str(s)) => s.len(),
                Some(Value::List(items)) => items.len(),
                _ => return Err("invalid argument for len".to_string()),
            };
            one(Value::Int(i64::try_from(n).map_err(|e| e.to_string())?))
        })
        .type_def("int", "int", Some(Type::Int), Some(&[]))
        .type_def("float64", "float64", Some(Type::Float64), Some(&[]))
        .type_def("string", "string", Some(Type::String), Some(&[]))
        .type_def("bool", "bool", Some(Type::Bool), Some(&[]))
        .type_def("error", "interface", None, Some(&["Error"]))
}

/// Every importable package.
pub fn standard_packages() -> Vec<Package> {
    vec![math(), strings(), strconv(), fmt(), os()]
}

// ---------------------------------------------------------------------------
// math
// ---------------------------------------------------------------------------

fn math() -> Package {
    let unary = || sig(vec![Type::Float64], vec![Type::Float64]);
    Package::new("math")
        .constant("Pi", Value::Float(std::f64::consts::PI))
        .constant("E", Value::Float(std::f64::consts::E))
        .constant("MaxInt64", Value::Int(i64::MAX))
        .func("Sqrt", unary(), |args, _| one(Value::Float(float_arg(args, 0)?.sqrt())))
        .func("Abs", unary(), |args, _| one(Value::Float(float_arg(args, 0)?.abs())))
        .func("Floor", unary(), |args, _| {
            one(Value::Float(float_arg(args, 0)?.floor()))
        })
        .func(
            "Pow",
            sig(vec![Type::Float64, Type::Float64], vec![Type::Float64]),
            |args, _| one(Value::Float(float_arg(args, 0)?.powf(float_arg(args, 1)?))),
        )
        .func(
            "Modf",
            sig(vec![Type::Float64], vec![Type::Float64, Type::Float64]),
            |args, _| {
                let x = float_arg(args, 0)?;
                let int = x.trunc();
                Ok(vec![Value::Float(int), Value::Float(x - int)])
            },
        )
}

// ---------------------------------------------------------------------------
// strings
// ---------------------------------------------------------------------------

const BUILDER_METHODS: &[&str] = &[
    "Cap",
    "Grow",
    "Len",
    "Reset",
    "String",
    "Write",
    "WriteByte",
    "WriteRune",
    "WriteString",
];

const READER_METHODS: &[&str] = &[
    "Len",
    "Read",
    "ReadAt",
    "ReadByte",
    "ReadRune",
    "Reset",
    "Seek",
    "Size",
    "UnreadByte",
    "UnreadRune",
    "WriteTo",
];

fn strings() -> Package {
    let str_to_str = || sig(vec![Type::String], vec![Type::String]);
    Package::new("strings")
        .func("ToUpper", str_to_str(), |args, _| {
            one(Value::Str(str_arg(args, 0)?.to_uppercase()))
        })
        .func("ToLower", str_to_str(), |args, _| {
            one(Value::Str(str_arg(args, 0)?.to_lowercase()))
        })
        .func(
            "Contains",
            sig(vec![Type::String, Type::String], vec![Type::Bool]),
            |args, _| one(Value::Bool(str_arg(args, 0)?.contains(str_arg(args, 1)?))),
        )
        .func(
            "Repeat",
            sig(vec![Type::String, Type::Int], vec![Type::String]),
            |args, _| {
                let count = usize::try_from(int_arg(args, 1)?)
                    .map_err(|_| "strings: negative Repeat count".to_string())?;
                let s = str_arg(args, 0)?;
                if s.len().checked_mul(count).is_none() {
                    return Err("strings: Repeat output length overflow".to_string());
                }
                one(Value::Str(s.repeat(count)))
            },
        )
        .func("Fields", sig(vec![Type::String], vec![Type::List]), |args, _| {
            one(str_list(str_arg(args, 0)?.split_whitespace()))
        })
        .func(
            "Split",
            sig(vec![Type::String, Type::String], vec![Type::List]),
            |args, _| {
                let s = str_arg(args, 0)?;
                let sep = str_arg(args, 1)?;
                if sep.is_empty() {
                    let chars: Vec<String> = s.chars().map(String::from).collect();
                    return one(str_list(chars.iter().map(String::as_str)));
                }
                one(str_list(s.split(sep)))
            },
        )
        .type_def("Builder", "struct", None, Some(BUILDER_METHODS))
        .type_def("Reader", "struct", None, Some(READER_METHODS))
}

// ---------------------------------------------------------------------------
// strconv
// ---------------------------------------------------------------------------

fn strconv() -> Package {
    Package::new("strconv")
        .constant("IntSize", Value::Int(64))
        .func("Itoa", sig(vec![Type::Int], vec![Type::String]), |args, _| {
            one(Value::Str(int_arg(args, 0)?.to_string()))
        })
        .func(
            "Atoi",
            sig(vec![Type::String], vec![Type::Int, Type::Error]),
            |args, _| {
                let s = str_arg(args, 0)?;
                let (n, err) = match s.parse::<i64>() {
                    Ok(n) => (n, None),
                    Err(e) => {
                        let reason = match e.kind() {
                            std::num::IntErrorKind::PosOverflow
                            | std::num::IntErrorKind::NegOverflow => "value out of range",
                            _ => "invalid syntax",
                        };
                        let msg = format!("strconv.Atoi: parsing {}: {reason}", go_quote(s));
                        (0, Some(msg))
                    },
                };
                Ok(vec![Value::Int(n), Value::Error(err)])
            },
        )
        .func("Quote", sig(vec![Type::String], vec![Type::String]), |args, _| {
            one(Value::Str(go_quote(str_arg(args, 0)?)))
        })
}

// ---------------------------------------------------------------------------
// fmt
// ---------------------------------------------------------------------------

/// Operands joined the way `fmt.Sprint` does: a space only between two
/// operands when neither is a string.
fn sprint(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        let is_str = matches!(arg, Value::Str(_));
        if i > 0 && !is_str && !matches!(args[i - 1], Value::Str(_)) {
            out.push(' ');
        }
        out.push_str(&arg.plain());
    }
    out
}

fn fmt() -> Package {
    Package::new("fmt")
        .func("Println", variadic_sig(Type::Any, vec![]), |args, out| {
            let line: Vec<String> = args.iter().map(Value::plain).collect();
            writeln!(out, "{}", line.join(" ")).map_err(|e| e.to_string())?;
            out.flush().map_err(|e| e.to_string())?;
            Ok(Vec::new())
        })
        .func(
            "Sprint",
            variadic_sig(Type::Any, vec![Type::String]),
            |args, _| one(Value::Str(sprint(args))),
        )
        .type_def("Stringer", "interface", None, Some(&["String"]))
}

// ---------------------------------------------------------------------------
// os
// ---------------------------------------------------------------------------

fn os() -> Package {
    let args: Vec<String> = std::env::args().collect();
    Package::new("os")
        .var("Args", str_list(args.iter().map(String::as_str)))
        .func("Getenv", sig(vec![Type::String], vec![Type::String]), |args, _| {
            one(Value::Str(std::env::var(str_arg(args, 0)?).unwrap_or_default()))
        })
        .type_def("File", "struct", None, None)
}
