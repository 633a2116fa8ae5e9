//! A tree-walk interpreter for tinyscript, a small dynamically scoped
//! scripting language.
//!
//! Source text is tokenized, parsed into an AST by a recursive-descent parser
//! with one function per precedence layer, and executed directly by a
//! recursive evaluator. A program is a single statement (usually a block).
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - The scanner and parser do not attempt any error recovery.  They bail out
//! on the first encountered error.
//! - Scoping is dynamic: free variables in a function body resolve through
//! the chain of callers, not the chain of definers.
//! - Deep recursion is bounded only by the host stack.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod interpreter;

mod ast;
mod diag;
mod eval;
mod parser;
mod scanner;
mod token;
