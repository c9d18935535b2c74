//! Foundation types for shoal.
//!
//! This crate contains the types shared by every shoal crate: the error
//! type, the shell configuration, and the contract an expression evaluator
//! must satisfy to sit behind the REPL.

pub mod config;
pub mod error;
pub mod eval;
