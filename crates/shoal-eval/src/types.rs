//! Static types known to the checker.

use std::fmt;

/// The type of a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float64,
    String,
    Bool,
    Error,
    /// `interface {}`: holds a value of any type.
    Any,
    /// `[]interface {}`.
    List,
    Func(Box<Signature>),
    /// The read-only view of the live environment.
    Env,
}

impl Type {
    /// Kind name, in the style of runtime reflection.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float64 => "float64",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Error | Self::Any => "interface",
            Self::List => "slice",
            Self::Func(_) => "func",
            Self::Env => "struct",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float64)
    }

    pub fn func(params: Vec<Type>, results: Vec<Type>) -> Self {
        Self::Func(Box::new(Signature {
            params,
            variadic: None,
            results,
        }))
    }

    pub fn variadic(params: Vec<Type>, rest: Type, results: Vec<Type>) -> Self {
        Self::Func(Box::new(Signature {
            params,
            variadic: Some(rest),
            results,
        }))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float64 => f.write_str("float64"),
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Error => f.write_str("error"),
            Self::Any => f.write_str("interface {}"),
            Self::List => f.write_str("[]interface {}"),
            Self::Func(sig) => write!(f, "{sig}"),
            Self::Env => f.write_str("repl.Env"),
        }
    }
}

/// Parameter and result types of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Type>,
    /// Element type of a trailing `...` parameter.
    pub variadic: Option<Type>,
    pub results: Vec<Type>,
}

impl Signature {
    /// Declared type of the `i`th argument, if the signature takes one.
    pub fn param(&self, i: usize) -> Option<&Type> {
        self.params.get(i).or(self.variadic.as_ref())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params: Vec<String> = self.params.iter().map(Type::to_string).collect();
        if let Some(rest) = &self.variadic {
            params.push(format!("...{rest}"));
        }
        write!(f, "func({})", params.join(", "))?;
        match self.results.as_slice() {
            [] => Ok(()),
            [only] => write!(f, " {only}"),
            many => {
                let names: Vec<String> = many.iter().map(Type::to_string).collect();
                write!(f, " ({})", names.join(", "))
            },
        }
    }
}
