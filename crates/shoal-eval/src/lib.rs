//! The built-in expression evaluator for shoal.
//!
//! A small Go-flavoured expression language: literals, package members,
//! calls, indexing, arithmetic and comparison operators, and `name := expr`
//! declarations. [`Interpreter`] implements the REPL's
//! [`Evaluator`](shoal_types::eval::Evaluator) contract over an
//! [`Environment`] preloaded with `math`, `strings`, `strconv`, `fmt`, and
//! `os`.

pub mod ast;
pub mod checker;
pub mod env;
pub mod interp;
pub mod lexer;
pub mod ops;
pub mod packages;
pub mod parser;
pub mod types;
pub mod value;

pub use checker::Checked;
pub use env::Environment;
pub use interp::Interpreter;
pub use types::Type;
pub use value::{Evaluated, Value};
