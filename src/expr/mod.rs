//! Mini-interpreter for `{{ ... }}` marker expressions

pub mod ast;
pub mod eval;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use eval::{eval_marker, EvalHost, NoIncludes};
pub use grammar::parse;
