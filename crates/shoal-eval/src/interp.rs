//! Tree-walking evaluation of checked statements.

use std::io::{self, Write};

use shoal_types::eval::{
    CheckError, EvalError, Evaluator, Introspect, MethodLookup, PackageInfo, ParseError,
    TOP_LEVEL, TypeInfo,
};

use crate::ast::{BinaryOp, Expr, ExprKind, Stmt};
use crate::checker::{self, Checked, Shape};
use crate::env::{Binding, Environment, Name};
use crate::ops;
use crate::packages::{Member, Package};
use crate::parser;
use crate::types::Type;
use crate::value::{Evaluated, Value};

/// The built-in evaluator: owns the environment and the stream that
/// printing functions write to.
pub struct Interpreter {
    env: Environment,
    out: Box<dyn Write>,
}

impl Interpreter {
    /// An interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            env: Environment::new(),
            out,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Run a checked statement. `None` means `nil`.
    pub fn exec(&mut self, checked: &Checked) -> Result<Option<Vec<Evaluated>>, String> {
        if let Some(value) = checked.constant_value() {
            return Ok(Some(vec![Evaluated {
                value: value.clone(),
                constant: true,
            }]));
        }
        if *checked.shape() == Shape::Nil {
            return Ok(None);
        }
        let values = match checked.stmt() {
            Stmt::Expr(expr) => self.eval_multi(expr)?,
            Stmt::Define { name, value } => {
                let value = self.eval_single(value)?;
                let ty = match checked.shape() {
                    Shape::Values(types) => types.first().cloned().unwrap_or(Type::Any),
                    Shape::Nil => Type::Any,
                };
                self.env.define(
                    name,
                    Binding {
                        value: value.clone(),
                        ty,
                    },
                )?;
                vec![value]
            },
        };
        Ok(Some(
            values
                .into_iter()
                .map(|value| Evaluated {
                    value,
                    constant: false,
                })
                .collect(),
        ))
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    /// Evaluate an expression that may produce any number of values.
    fn eval_multi(&mut self, e: &Expr) -> Result<Vec<Value>, String> {
        match &e.kind {
            ExprKind::Call { callee, args } => self.call(callee, args),
            ExprKind::Paren(inner) => self.eval_multi(inner),
            _ => Ok(vec![self.eval_single(e)?]),
        }
    }

    fn eval_single(&mut self, e: &Expr) -> Result<Value, String> {
        match &e.kind {
            ExprKind::Int(n) => Ok(Value::Int(*n)),
            ExprKind::Float(x) => Ok(Value::Float(*x)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::Ident(name) => self.ident(name),
            ExprKind::Selector { target, name } => self.selector(e, target, name),
            ExprKind::Call { .. } => {
                let mut values = self.eval_multi(e)?;
                if values.len() != 1 {
                    return Err(format!("{e} does not produce a single value"));
                }
                Ok(values.remove(0))
            },
            ExprKind::Index { target, index } => {
                let target = self.eval_single(target)?;
                let index = self.eval_single(index)?;
                index_value(&target, &index)
            },
            ExprKind::Unary { op, operand } => {
                let value = self.eval_single(operand)?;
                ops::unary(*op, &value)
            },
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            ExprKind::Paren(inner) => self.eval_single(inner),
        }
    }

    fn ident(&self, name: &str) -> Result<Value, String> {
        match self.env.resolve(name) {
            Some(Name::Var(binding)) => Ok(binding.value),
            Some(Name::Const(value)) => Ok(value),
            Some(Name::Nil) => Ok(Value::Error(None)),
            Some(Name::Func(builtin)) => Ok(Value::Func(builtin.clone())),
            Some(Name::Type(_) | Name::Package(_)) => Err(format!("{name} is not a value")),
            None => Err(format!("undefined: {name}")),
        }
    }

    fn selector(&self, e: &Expr, target: &Expr, name: &str) -> Result<Value, String> {
        let Some(pkg) = target.as_ident().and_then(|p| self.env.package(p)) else {
            return Err(format!("{e} is not a package member"));
        };
        match pkg.member(name) {
            Some(Member::Const(value)) => Ok(value.clone()),
            Some(Member::Func(builtin)) => Ok(Value::Func(builtin.clone())),
            Some(Member::Var(binding)) => Ok(binding.value.clone()),
            Some(Member::Type(_)) => Err(format!("{e} is not a value")),
            None => Err(format!("undefined: {e}")),
        }
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Result<Value, String> {
        let left = self.eval_single(lhs)?;
        match (op, left.as_bool()) {
            (BinaryOp::And, Some(false)) => return Ok(Value::Bool(false)),
            (BinaryOp::Or, Some(true)) => return Ok(Value::Bool(true)),
            _ => {},
        }
        let right = self.eval_single(rhs)?;
        ops::binary(op, &left, &right)
    }

    fn call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Vec<Value>, String> {
        if let Some(name) = callee.as_ident()
            && let Some(Name::Type(def)) = self.env.resolve(name)
        {
            let target = def
                .value_type
                .clone()
                .ok_or_else(|| format!("cannot convert to {name}"))?;
            let [arg] = args else {
                return Err(format!("conversion to {name} takes one argument"));
            };
            let value = self.eval_single(arg)?;
            return Ok(vec![ops::convert(&value, &target)?]);
        }

        let Value::Func(builtin) = self.eval_single(callee)? else {
            return Err(format!("cannot call non-function {callee}"));
        };
        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            let value = self.eval_single(arg)?;
            let value = match (builtin.sig.param(i), value) {
                (Some(Type::Float64), Value::Int(n)) => Value::Float(n as f64),
                (_, value) => value,
            };
            values.push(value);
        }
        log::trace!("calling {} with {} args", builtin.name, values.len());
        (builtin.call)(&values, self.out.as_mut())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn index_value(target: &Value, index: &Value) -> Result<Value, String> {
    let Some(i) = index.as_int() else {
        return Err(format!("index {index} is not an integer"));
    };
    let out_of_range = |len: usize| format!("index out of range [{i}] with length {len}");
    match target {
        Value::List(items) => usize::try_from(i)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| out_of_range(items.len())),
        Value::Str(s) => usize::try_from(i)
            .ok()
            .and_then(|i| s.as_bytes().get(i))
            .map(|b| Value::Int(i64::from(*b)))
            .ok_or_else(|| out_of_range(s.len())),
        other => Err(format!("cannot index {}", other.type_of())),
    }
}

// ---------------------------------------------------------------------------
// Collaborator contract
// ---------------------------------------------------------------------------

impl Evaluator for Interpreter {
    type Expr = Stmt;
    type Checked = Checked;
    type Value = Evaluated;

    fn parse(&self, source: &str) -> Result<Stmt, ParseError> {
        parser::parse_line(source)
    }

    fn check(&self, expr: &Stmt) -> Result<Checked, Vec<CheckError>> {
        checker::check(&self.env, expr)
    }

    fn eval(&mut self, checked: &Checked) -> Result<Option<Vec<Evaluated>>, EvalError> {
        self.exec(checked).map_err(EvalError)
    }

    fn record_result(&mut self, index: usize, values: &[Evaluated]) {
        let value = match values {
            [single] => single.value.clone(),
            many => Value::List(many.iter().map(|v| v.value.clone()).collect()),
        };
        self.env.record_result(index, value);
    }
}

impl Interpreter {
    fn scope(&self, package: Option<&str>) -> Option<&Package> {
        match package {
            None | Some(TOP_LEVEL) => Some(self.env.universe()),
            Some(name) => self.env.package(name),
        }
    }
}

impl Introspect for Interpreter {
    fn package_names(&self) -> Vec<String> {
        self.env.package_names()
    }

    fn package(&self, name: &str) -> Option<PackageInfo> {
        self.env.package(name).map(Package::info)
    }

    fn lookup_type(&self, package: Option<&str>, name: &str) -> Option<TypeInfo> {
        let def = self.scope(package)?.types.get(name)?;
        Some(TypeInfo {
            name: def.name.clone(),
            kind: def.kind.to_string(),
        })
    }

    fn methods(&self, package: Option<&str>, name: &str) -> MethodLookup {
        let Some(scope) = self.scope(package) else {
            return MethodLookup::NoSuchPackage;
        };
        let top_level = matches!(package, None | Some(TOP_LEVEL));
        let var_type = if top_level {
            self.env.var(name).map(|b| b.ty)
        } else {
            scope.vars.get(name).map(|b| b.ty.clone())
        };
        if let Some(ty) = var_type {
            return MethodLookup::Variable(type_methods(&ty));
        }
        match scope.types.get(name) {
            Some(def) => match &def.methods {
                Some(methods) => MethodLookup::Type(methods.clone()),
                None => MethodLookup::NoMethodInfo,
            },
            None => MethodLookup::NoSuchMember,
        }
    }
}

/// Methods of a variable's static type.
fn type_methods(ty: &Type) -> Vec<String> {
    match ty {
        Type::Error => vec!["Error".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use shoal_types::eval::{CheckedExpr, DynamicValue};

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn interp() -> (Interpreter, Capture) {
        let capture = Capture::default();
        let interp = Interpreter::with_output(Box::new(capture.clone()));
        (interp, capture)
    }

    fn run(interp: &mut Interpreter, source: &str) -> Option<Vec<Evaluated>> {
        let stmt = interp.parse(source).unwrap();
        let checked = interp.check(&stmt).unwrap();
        interp.eval(&checked).unwrap()
    }

    fn run_one(interp: &mut Interpreter, source: &str) -> Evaluated {
        let mut values = run(interp, source).unwrap();
        assert_eq!(values.len(), 1, "expected one value from {source}");
        values.remove(0)
    }

    #[test]
    fn constant_expressions_are_flagged() {
        let (mut interp, _) = interp();
        let v = run_one(&mut interp, "2 * (3 + 4)");
        assert_eq!(v.value, Value::Int(14));
        assert!(v.is_constant());
        assert_eq!(v.kind_name(), "int");

        let v = run_one(&mut interp, "math.Sqrt(16)");
        assert_eq!(v.value, Value::Float(4.0));
        assert!(!v.is_constant());
    }

    #[test]
    fn package_calls() {
        let (mut interp, _) = interp();
        assert_eq!(
            run_one(&mut interp, "strings.ToUpper(\"abc\")").render(),
            "\"ABC\""
        );
        assert_eq!(run_one(&mut interp, "len(\"héllo\")").value, Value::Int(6));
        assert_eq!(
            run_one(&mut interp, "strings.Fields(\"a b\")").render(),
            "[a b]"
        );
        assert_eq!(run_one(&mut interp, "math.Pow(2, 10)").render(), "1024");
    }

    #[test]
    fn multi_value_calls() {
        let (mut interp, _) = interp();
        let values = run(&mut interp, "strconv.Atoi(\"42\")").unwrap();
        let rendered: Vec<String> = values.iter().map(DynamicValue::render).collect();
        assert_eq!(rendered, ["42", "<nil>"]);

        let values = run(&mut interp, "strconv.Atoi(\"x\")").unwrap();
        assert_eq!(
            values[1].render(),
            "strconv.Atoi: parsing \"x\": invalid syntax"
        );
    }

    #[test]
    fn void_calls_write_to_the_output() {
        let (mut interp, capture) = interp();
        let values = run(&mut interp, "fmt.Println(\"hi\", 1 + 1)").unwrap();
        assert!(values.is_empty());
        assert_eq!(String::from_utf8(capture.0.borrow().clone()).unwrap(), "hi 2\n");
    }

    #[test]
    fn nil_has_no_values() {
        let (mut interp, _) = interp();
        assert!(run(&mut interp, "nil").is_none());
    }

    #[test]
    fn definitions_bind_variables() {
        let (mut interp, _) = interp();
        let v = run_one(&mut interp, "x := 20 + 1");
        assert_eq!(v.value, Value::Int(21));
        assert!(!v.is_constant());
        assert_eq!(run_one(&mut interp, "x * 2").value, Value::Int(42));
        assert_eq!(interp.environment().var_names(), ["x"]);
    }

    #[test]
    fn runtime_errors() {
        let (mut interp, _) = interp();
        run_one(&mut interp, "zero := 0");
        let checked = interp.check(&interp.parse("1 / zero").unwrap()).unwrap();
        assert_eq!(
            interp.eval(&checked),
            Err(EvalError("integer divide by zero".to_string()))
        );
        let checked = interp.check(&interp.parse("results[5]").unwrap()).unwrap();
        assert_eq!(
            interp.eval(&checked),
            Err(EvalError("index out of range [5] with length 0".to_string()))
        );
        let source = "strings.Repeat(\"ab\", math.MaxInt64)";
        let checked = interp.check(&interp.parse(source).unwrap()).unwrap();
        assert_eq!(
            interp.eval(&checked),
            Err(EvalError("strings: Repeat output length overflow".to_string()))
        );
    }

    #[test]
    fn results_and_env() {
        let (mut interp, _) = interp();
        let first = run(&mut interp, "1 + 1").unwrap();
        interp.record_result(0, &first);
        let pair = run(&mut interp, "strconv.Atoi(\"7\")").unwrap();
        interp.record_result(1, &pair);

        assert_eq!(run_one(&mut interp, "results[0]").value, Value::Int(2));
        assert_eq!(run_one(&mut interp, "results[1]").render(), "[7 <nil>]");
        assert_eq!(run_one(&mut interp, "len(results)").value, Value::Int(2));

        let env = run_one(&mut interp, "env");
        assert_eq!(env.kind_name(), "struct");
        assert_eq!(env.type_name(), "repl.Env");
        assert_eq!(env.render(), "{Packages:5 Vars:0 Results:2}");
    }

    #[test]
    fn short_circuit() {
        let (mut interp, _) = interp();
        run_one(&mut interp, "zero := 0");
        assert_eq!(
            run_one(&mut interp, "zero != 0 && 1 / zero > 0").value,
            Value::Bool(false)
        );
        assert_eq!(
            run_one(&mut interp, "zero == 0 || 1 / zero > 0").value,
            Value::Bool(true)
        );
    }

    #[test]
    fn error_values_compare_with_nil() {
        let (mut interp, _) = interp();
        interp
            .env
            .define(
                "err",
                Binding {
                    value: Value::Error(None),
                    ty: Type::Error,
                },
            )
            .unwrap();
        assert_eq!(run_one(&mut interp, "err == nil").value, Value::Bool(true));
        assert_eq!(run_one(&mut interp, "nil != err").value, Value::Bool(false));
    }

    #[test]
    fn conversions_at_runtime() {
        let (mut interp, _) = interp();
        run_one(&mut interp, "f := 2.9");
        assert_eq!(run_one(&mut interp, "int(f)").value, Value::Int(2));
        run_one(&mut interp, "n := 3");
        assert_eq!(run_one(&mut interp, "float64(n) / 2").value, Value::Float(1.5));
    }

    #[test]
    fn check_and_parse_errors_surface() {
        let (interp, _) = interp();
        let err = interp.parse("1 +").unwrap_err();
        assert_eq!(err.message, "expected operand, found 'EOF'");
        let stmt = interp.parse("undefined_thing").unwrap();
        let errs = interp.check(&stmt).unwrap_err();
        assert_eq!(errs, [CheckError("undefined: undefined_thing".to_string())]);
    }

    #[test]
    fn whatis_view_of_checked_expressions() {
        let (interp, _) = interp();
        let checked = interp.check(&interp.parse("math.Modf(2.5)").unwrap()).unwrap();
        assert_eq!(checked.known_types(), ["float64", "float64"]);
        assert_eq!(checked.constant(), None);
    }

    #[test]
    fn introspection() {
        let (interp, _) = interp();
        assert!(interp.is_package("math"));
        assert_eq!(interp.package("strconv").unwrap().consts, ["IntSize"]);
        assert_eq!(
            interp.lookup_type(Some("strings"), "Builder"),
            Some(TypeInfo {
                name: "strings.Builder".to_string(),
                kind: "struct".to_string(),
            })
        );
        assert_eq!(
            interp.lookup_type(None, "error").map(|t| t.kind),
            Some("interface".to_string())
        );
        assert!(interp.lookup_type(None, "Builder").is_none());

        match interp.methods(Some("strings"), "Reader") {
            MethodLookup::Type(methods) => assert!(methods.contains(&"ReadRune".to_string())),
            other => panic!("expected type methods, got {other:?}"),
        }
        assert_eq!(interp.methods(Some("os"), "File"), MethodLookup::NoMethodInfo);
        assert_eq!(interp.methods(Some("os"), "Args"), MethodLookup::Variable(Vec::new()));
        assert_eq!(interp.methods(Some("nope"), "X"), MethodLookup::NoSuchPackage);
        assert_eq!(interp.methods(None, "Sqrt"), MethodLookup::NoSuchMember);
        assert_eq!(interp.methods(None, "int"), MethodLookup::Type(Vec::new()));
        assert_eq!(interp.methods(None, "env"), MethodLookup::Variable(Vec::new()));
    }
}
