//! Type checking and constant folding.
//!
//! The checker walks a parsed line against the environment, reports every
//! problem it finds, and records the result types and, for constant
//! expressions, the folded value.

use shoal_types::eval::{CheckError, CheckedExpr};

use crate::ast::{BinaryOp, Expr, ExprKind, Stmt};
use crate::env::{Environment, Name, is_reserved};
use crate::ops;
use crate::packages::Member;
use crate::types::{Signature, Type};
use crate::value::Value;

/// What an expression produces.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// The untyped `nil`.
    Nil,
    /// Zero or more values; zero for calls with no results.
    Values(Vec<Type>),
}

/// A statement that passed type checking.
#[derive(Debug, Clone)]
pub struct Checked {
    stmt: Stmt,
    shape: Shape,
    constant: Option<Value>,
}

impl Checked {
    pub fn stmt(&self) -> &Stmt {
        &self.stmt
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The folded value of a constant expression.
    pub fn constant_value(&self) -> Option<&Value> {
        self.constant.as_ref()
    }
}

impl CheckedExpr for Checked {
    fn describe(&self) -> String {
        self.stmt.to_string()
    }

    fn constant(&self) -> Option<String> {
        self.constant.as_ref().map(Value::to_string)
    }

    fn known_types(&self) -> Vec<String> {
        match &self.shape {
            Shape::Nil => vec!["untyped nil".to_string()],
            Shape::Values(types) => types.iter().map(Type::to_string).collect(),
        }
    }
}

/// Check one statement against the environment.
pub fn check(env: &Environment, stmt: &Stmt) -> Result<Checked, Vec<CheckError>> {
    let mut checker = Checker {
        env,
        errors: Vec::new(),
    };
    let info = match stmt {
        Stmt::Expr(expr) => checker.expr(expr),
        Stmt::Define { name, value } => checker.define(name, value),
    };
    match info {
        Some(info) if checker.errors.is_empty() => Ok(Checked {
            stmt: stmt.clone(),
            shape: info.shape,
            constant: info.constant,
        }),
        _ => {
            if checker.errors.is_empty() {
                checker.errors.push(CheckError(format!("invalid expression {stmt}")));
            }
            Err(checker.errors)
        },
    }
}

#[derive(Debug, Clone)]
struct Info {
    shape: Shape,
    constant: Option<Value>,
}

impl Info {
    fn single(ty: Type, constant: Option<Value>) -> Self {
        Self {
            shape: Shape::Values(vec![ty]),
            constant,
        }
    }
}

struct Checker<'a> {
    env: &'a Environment,
    errors: Vec<CheckError>,
}

impl Checker<'_> {
    fn error<T>(&mut self, message: impl Into<String>) -> Option<T> {
        self.errors.push(CheckError(message.into()));
        None
    }

    fn define(&mut self, name: &str, value: &Expr) -> Option<Info> {
        if is_reserved(name) {
            return self.error(format!("cannot assign to {name} (read-only)"));
        }
        let info = self.expr(value)?;
        if info.shape == Shape::Nil {
            return self.error("use of untyped nil in assignment");
        }
        if let Shape::Values(types) = &info.shape
            && types.len() > 1
        {
            return self.error(format!(
                "assignment mismatch: 1 variable but {value} returns {} values",
                types.len()
            ));
        }
        let (ty, _) = self.expect_single(value, info)?;
        Some(Info::single(ty, None))
    }

    fn expr(&mut self, e: &Expr) -> Option<Info> {
        match &e.kind {
            ExprKind::Int(n) => Some(Info::single(Type::Int, Some(Value::Int(*n)))),
            ExprKind::Float(x) => Some(Info::single(Type::Float64, Some(Value::Float(*x)))),
            ExprKind::Str(s) => Some(Info::single(Type::String, Some(Value::Str(s.clone())))),
            ExprKind::Ident(name) => self.ident(name),
            ExprKind::Selector { target, name } => self.selector(e, target, name),
            ExprKind::Call { callee, args } => self.call(callee, args),
            ExprKind::Index { target, index } => self.index(e, target, index),
            ExprKind::Unary { op, operand } => {
                let (ty, constant) = self.single(operand)?;
                let ty = match ops::unary_type(*op, &ty) {
                    Ok(ty) => ty,
                    Err(msg) => return self.error(msg),
                };
                let constant = match constant {
                    Some(c) => match ops::unary(*op, &c) {
                        Ok(v) => Some(v),
                        Err(msg) => return self.error(fold_error(e, &msg)),
                    },
                    None => None,
                };
                Some(Info::single(ty, constant))
            },
            ExprKind::Binary { op, lhs, rhs } => self.binary(e, *op, lhs, rhs),
            ExprKind::Paren(inner) => self.expr(inner),
        }
    }

    /// Check an expression used where exactly one value is needed.
    fn single(&mut self, e: &Expr) -> Option<(Type, Option<Value>)> {
        let info = self.expr(e)?;
        self.expect_single(e, info)
    }

    fn expect_single(&mut self, e: &Expr, info: Info) -> Option<(Type, Option<Value>)> {
        match info.shape {
            Shape::Nil => self.error("use of untyped nil"),
            Shape::Values(mut types) => match types.len() {
                1 => types.pop().map(|ty| (ty, info.constant)),
                0 => self.error(format!("{e} (no value) used as value")),
                _ => self.error(format!("multiple-value {e} in single-value context")),
            },
        }
    }

    fn ident(&mut self, name: &str) -> Option<Info> {
        match self.env.resolve(name) {
            Some(Name::Var(binding)) => Some(Info::single(binding.ty, None)),
            Some(Name::Const(value)) => Some(Info::single(value.type_of(), Some(value))),
            Some(Name::Nil) => Some(Info {
                shape: Shape::Nil,
                constant: None,
            }),
            Some(Name::Func(builtin)) => Some(Info::single(
                Type::Func(Box::new(builtin.sig.clone())),
                None,
            )),
            Some(Name::Type(_)) => self.error(format!("{name} (type) is not an expression")),
            Some(Name::Package(_)) => self.error(format!("use of package {name} without selector")),
            None => self.error(format!("undefined: {name}")),
        }
    }

    fn selector(&mut self, e: &Expr, target: &Expr, name: &str) -> Option<Info> {
        if let Some(pkg_name) = target.as_ident()
            && let Some(Name::Package(pkg)) = self.env.resolve(pkg_name)
        {
            return match pkg.member(name) {
                Some(Member::Const(value)) => {
                    Some(Info::single(value.type_of(), Some(value.clone())))
                },
                Some(Member::Func(builtin)) => Some(Info::single(
                    Type::Func(Box::new(builtin.sig.clone())),
                    None,
                )),
                Some(Member::Var(binding)) => Some(Info::single(binding.ty.clone(), None)),
                Some(Member::Type(_)) => self.error(format!("{e} (type) is not an expression")),
                None => self.error(format!("undefined: {e}")),
            };
        }
        let (ty, _) = self.single(target)?;
        self.error(format!(
            "{e} undefined (type {ty} has no field or method {name})"
        ))
    }

    fn index(&mut self, e: &Expr, target: &Expr, index: &Expr) -> Option<Info> {
        let target_info = self.single(target);
        let index_info = self.single(index);
        let ((target_ty, _), (index_ty, index_const)) = (target_info?, index_info?);

        if index_ty != Type::Int {
            return self.error(format!(
                "invalid argument: index {index} (type {index_ty}) must be integer"
            ));
        }
        if let Some(Value::Int(n)) = index_const
            && n < 0
        {
            return self.error(format!(
                "invalid argument: index {index} (constant of type int) must not be negative"
            ));
        }
        match target_ty {
            Type::List => Some(Info::single(Type::Any, None)),
            Type::String => Some(Info::single(Type::Int, None)),
            other => self.error(format!(
                "invalid operation: {e} (type {other} does not support indexing)"
            )),
        }
    }

    fn binary(&mut self, e: &Expr, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Option<Info> {
        let left = self.expr(lhs);
        let right = self.expr(rhs);
        let (left, right) = (left?, right?);

        // `err == nil` and `err != nil`.
        if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            let error = Shape::Values(vec![Type::Error]);
            match (&left.shape, &right.shape) {
                (Shape::Nil, Shape::Nil) => {
                    return self.error(format!(
                        "invalid operation: {e} (operator {op} not defined on nil)"
                    ));
                },
                (Shape::Nil, other) | (other, Shape::Nil) if *other == error => {
                    return Some(Info::single(Type::Bool, None));
                },
                _ => {},
            }
        }

        let left = self.expect_single(lhs, left);
        let right = self.expect_single(rhs, right);
        let ((lt, lc), (rt, rc)) = (left?, right?);
        let ty = match ops::binary_type(op, &lt, lc.is_some(), &rt, rc.is_some()) {
            Ok(ty) => ty,
            Err(msg) => return self.error(msg),
        };
        let constant = match (lc, rc) {
            (Some(a), Some(b)) => match ops::binary(op, &a, &b) {
                Ok(v) => Some(v),
                Err(msg) => return self.error(fold_error(e, &msg)),
            },
            _ => None,
        };
        Some(Info::single(ty, constant))
    }

    fn call(&mut self, callee: &Expr, args: &[Expr]) -> Option<Info> {
        if let Some(name) = callee.as_ident()
            && let Some(Name::Type(def)) = self.env.resolve(name)
        {
            return match def.value_type.clone() {
                Some(target) => self.conversion(callee, target, args),
                None => self.error(format!("cannot convert to {name}")),
            };
        }

        let (callee_ty, _) = self.single(callee)?;
        let sig = match callee_ty {
            Type::Func(sig) => sig,
            other => {
                return self.error(format!(
                    "invalid operation: cannot call non-function {callee} (type {other})"
                ));
            },
        };

        let fixed = sig.params.len();
        if args.len() < fixed {
            return self.error(format!("not enough arguments in call to {callee}"));
        }
        if sig.variadic.is_none() && args.len() > fixed {
            return self.error(format!("too many arguments in call to {callee}"));
        }

        let mut arg_types = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            arg_types.push(self.argument(callee, &sig, i, arg));
        }
        let arg_types: Option<Vec<Type>> = arg_types.into_iter().collect();
        let arg_types = arg_types?;

        if self.is_len(callee)
            && let Some(ty) = arg_types.first()
            && !matches!(ty, Type::String | Type::List)
        {
            let arg = &args[0];
            return self.error(format!("invalid argument: {arg} (type {ty}) for len"));
        }

        Some(Info {
            shape: Shape::Values(sig.results.clone()),
            constant: None,
        })
    }

    /// Check one call argument against its parameter; returns its type.
    fn argument(&mut self, callee: &Expr, sig: &Signature, i: usize, arg: &Expr) -> Option<Type> {
        let param = sig.param(i)?.clone();
        let info = self.expr(arg)?;
        if info.shape == Shape::Nil {
            return if matches!(param, Type::Any | Type::Error) {
                Some(param)
            } else {
                self.error(format!(
                    "cannot use nil as type {param} in argument to {callee}"
                ))
            };
        }
        let (ty, constant) = self.expect_single(arg, info)?;
        let widened_constant = ty == Type::Int && param == Type::Float64 && constant.is_some();
        if param == Type::Any || ty == param || widened_constant {
            Some(ty)
        } else {
            self.error(format!(
                "cannot use {arg} (type {ty}) as type {param} in argument to {callee}"
            ))
        }
    }

    fn is_len(&self, callee: &Expr) -> bool {
        callee.as_ident().is_some_and(|name| {
            matches!(self.env.resolve(name), Some(Name::Func(b)) if b.name == "len")
        })
    }

    fn conversion(&mut self, callee: &Expr, target: Type, args: &[Expr]) -> Option<Info> {
        let arg = match args {
            [arg] => arg,
            [] => return self.error(format!("missing argument in conversion to {callee}")),
            _ => return self.error(format!("too many arguments in conversion to {callee}")),
        };
        let (ty, constant) = self.single(arg)?;
        if !ops::convertible(&ty, &target) {
            return self.error(format!("cannot convert {arg} (type {ty}) to type {target}"));
        }
        let constant = match constant {
            Some(Value::Float(x)) if target == Type::Int && x.fract() != 0.0 => {
                return self.error(format!("constant {arg} truncated to integer"));
            },
            Some(c) => ops::convert(&c, &target).ok(),
            None => None,
        };
        Some(Info::single(target, constant))
    }
}

/// Diagnostic for a constant expression that cannot be folded.
fn fold_error(e: &Expr, msg: &str) -> String {
    if msg.contains("divide by zero") {
        "invalid operation: division by zero".to_string()
    } else {
        format!("constant {e} overflows int")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_line;

    fn checked(source: &str) -> Checked {
        let env = Environment::new();
        check(&env, &parse_line(source).unwrap()).unwrap()
    }

    fn errors(source: &str) -> Vec<String> {
        let env = Environment::new();
        check(&env, &parse_line(source).unwrap())
            .unwrap_err()
            .into_iter()
            .map(|e| e.0)
            .collect()
    }

    #[test]
    fn constants_fold() {
        let c = checked("1 + 2 * 3");
        assert_eq!(c.constant(), Some("7".to_string()));
        assert_eq!(c.known_types(), ["int"]);
        assert_eq!(c.describe(), "1 + 2 * 3");

        let c = checked("math.Pi * 2");
        assert_eq!(c.known_types(), ["float64"]);
        assert_eq!(c.constant(), Some("6.283185307179586".to_string()));

        let c = checked("\"a\" + \"b\"");
        assert_eq!(c.constant(), Some("\"ab\"".to_string()));
        assert_eq!(checked("!true").constant(), Some("false".to_string()));
    }

    #[test]
    fn calls_are_not_constant() {
        let c = checked("math.Sqrt(2)");
        assert_eq!(c.constant(), None);
        assert_eq!(c.known_types(), ["float64"]);
    }

    #[test]
    fn multi_and_void_results() {
        assert_eq!(checked("strconv.Atoi(\"1\")").known_types(), ["int", "error"]);
        assert!(checked("fmt.Println(1, \"a\")").known_types().is_empty());
        assert_eq!(*checked("nil").shape(), Shape::Nil);
        assert_eq!(checked("nil").known_types(), ["untyped nil"]);
    }

    #[test]
    fn function_values() {
        assert_eq!(
            checked("math.Pow").known_types(),
            ["func(float64, float64) float64"]
        );
        assert_eq!(checked("len").known_types(), ["func(interface {}) int"]);
    }

    #[test]
    fn undefined_names() {
        assert_eq!(errors("nope + 1"), ["undefined: nope"]);
        assert_eq!(errors("math.Nope"), ["undefined: math.Nope"]);
        assert_eq!(errors("a + b"), ["undefined: a", "undefined: b"]);
    }

    #[test]
    fn type_errors() {
        assert_eq!(
            errors("1 + \"a\""),
            ["invalid operation: mismatched types int and string"]
        );
        assert_eq!(
            errors("strings.ToUpper(1)"),
            ["cannot use 1 (type int) as type string in argument to strings.ToUpper"]
        );
        assert_eq!(errors("math.Sqrt()"), ["not enough arguments in call to math.Sqrt"]);
        assert_eq!(errors("math.Sqrt(1, 2)"), ["too many arguments in call to math.Sqrt"]);
        assert_eq!(errors("len(3)"), ["invalid argument: 3 (type int) for len"]);
        assert_eq!(
            errors("math.Pi()"),
            ["invalid operation: cannot call non-function math.Pi (type float64)"]
        );
    }

    #[test]
    fn value_context_errors() {
        assert_eq!(
            errors("strconv.Atoi(\"1\") + 1"),
            ["multiple-value strconv.Atoi(\"1\") in single-value context"]
        );
        assert_eq!(
            errors("fmt.Println() + 1"),
            ["fmt.Println() (no value) used as value"]
        );
        assert_eq!(errors("math"), ["use of package math without selector"]);
        assert_eq!(errors("int"), ["int (type) is not an expression"]);
        assert_eq!(errors("strings.Builder"), ["strings.Builder (type) is not an expression"]);
    }

    #[test]
    fn constant_errors() {
        assert_eq!(errors("1 / 0"), ["invalid operation: division by zero"]);
        assert_eq!(
            errors("math.MaxInt64 + 1"),
            ["constant math.MaxInt64 + 1 overflows int"]
        );
    }

    #[test]
    fn int_constants_widen_for_float_parameters() {
        assert!(check(&Environment::new(), &parse_line("math.Sqrt(2)").unwrap()).is_ok());
        let mut env = Environment::new();
        env.define(
            "n",
            crate::env::Binding {
                value: Value::Int(2),
                ty: Type::Int,
            },
        )
        .unwrap();
        let errs = check(&env, &parse_line("math.Sqrt(n)").unwrap()).unwrap_err();
        assert_eq!(
            errs[0].0,
            "cannot use n (type int) as type float64 in argument to math.Sqrt"
        );
    }

    #[test]
    fn indexing() {
        assert_eq!(checked("results[0]").known_types(), ["interface {}"]);
        assert_eq!(checked("\"abc\"[1]").known_types(), ["int"]);
        assert_eq!(
            errors("results[-1]"),
            ["invalid argument: index -1 (constant of type int) must not be negative"]
        );
        assert_eq!(
            errors("results[\"a\"]"),
            ["invalid argument: index \"a\" (type string) must be integer"]
        );
        assert_eq!(
            errors("1[0]"),
            ["invalid operation: 1[0] (type int does not support indexing)"]
        );
    }

    #[test]
    fn error_comparisons_with_nil() {
        let mut env_with_err = Environment::new();
        env_with_err
            .define(
                "err",
                crate::env::Binding {
                    value: Value::Error(None),
                    ty: Type::Error,
                },
            )
            .unwrap();
        let c = check(&env_with_err, &parse_line("err == nil").unwrap()).unwrap();
        assert_eq!(c.known_types(), ["bool"]);
        assert!(check(&env_with_err, &parse_line("1 == nil").unwrap()).is_err());
    }

    #[test]
    fn conversions() {
        let c = checked("float64(3)");
        assert_eq!(c.known_types(), ["float64"]);
        assert_eq!(c.constant(), Some("3".to_string()));
        assert_eq!(checked("int(2.0)").constant(), Some("2".to_string()));
        assert_eq!(errors("int(2.5)"), ["constant 2.5 truncated to integer"]);
        assert_eq!(
            errors("int(\"a\")"),
            ["cannot convert \"a\" (type string) to type int"]
        );
        assert_eq!(errors("error(1)"), ["cannot convert to error"]);
    }

    #[test]
    fn definitions() {
        let c = checked("x := 1 + 1");
        assert_eq!(c.known_types(), ["int"]);
        assert_eq!(c.constant(), None);
        assert_eq!(c.describe(), "x := 1 + 1");
        assert_eq!(errors("x := nil"), ["use of untyped nil in assignment"]);
        assert_eq!(
            errors("x := strconv.Atoi(\"1\")"),
            ["assignment mismatch: 1 variable but strconv.Atoi(\"1\") returns 2 values"]
        );
        assert_eq!(errors("env := 1"), ["cannot assign to env (read-only)"]);
    }

    #[test]
    fn selector_on_value() {
        assert_eq!(
            errors("\"s\".Len"),
            ["\"s\".Len undefined (type string has no field or method Len)"]
        );
    }

    #[test]
    fn env_and_results_types() {
        assert_eq!(checked("env").known_types(), ["repl.Env"]);
        assert_eq!(checked("results").known_types(), ["[]interface {}"]);
        assert_eq!(checked("os.Args").known_types(), ["[]interface {}"]);
    }
}
