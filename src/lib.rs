#![warn(missing_docs)]
#![warn(clippy::pedantic)]
//#![warn(clippy::cargo)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

//! Lexer, parser, semantic analyzer and tree-walking interpreter for a small
//! Python-like language.
//!
//! Source text flows through [`tokenize`], [`parse`], [`analyze`] and, when
//! the analysis reports nothing, [`execute`]. [`Script`] bundles the steps.

/// Abstract syntax tree
pub mod ast;
/// Controls the command line interface
pub mod cli;
/// Crate errors.
pub mod error;
/// `Lexer`
pub mod lexer;
/// Script struct
pub mod script;
/// `Token` and `TokenKind`
pub mod token;
/// Runtime values
pub mod value;
/// `Program` visitors
pub mod visitors;

/// Builtin functions and methods
pub(crate) mod function;

mod environment;
mod operators;
mod template;

pub use ast::node::Program;
pub use ast::{BlockMode, ParserOptions};
pub use error::{
    LexerError, ParserError, RuntimeError, RuntimeFailure, ScriptError,
    SemanticDiagnostic,
};
pub use lexer::{tokenize, Tokenized};
pub use script::{Outcome, Script};
pub use token::{Token, TokenKind};
pub use value::Value;
pub use visitors::{Execution, ExecutionOptions, Limits, Scoping};

/// Parses `tokens` into a [`Program`].
pub fn parse(
    tokens: Vec<Token>,
    options: ParserOptions,
) -> Result<Program, ParserError> {
    ast::Parser::new(tokens, options).parse()
}

/// Semantic diagnostics for `program`, in traversal order.
pub fn analyze(program: &Program) -> Vec<SemanticDiagnostic> {
    visitors::SemanticAnalyzer::analyze(program)
}

/// Executes `program`. Callers should [`analyze`] it first.
pub fn execute(
    program: &Program,
    options: ExecutionOptions,
) -> Result<Execution, RuntimeFailure> {
    visitors::Interpreter::execute(program, options)
}
