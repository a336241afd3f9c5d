use crate::token::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error from the [lexer](crate::lexer) module. Lexing stops at the first one.
pub enum LexerError {
    /// Character that does not start any token.
    #[error(r#"Unrecognized character "{fragment}" at line {line_no}, column {col_no}!"#)]
    UnrecognizedCharacter {
        fragment: String,
        line_no: usize,
        col_no: usize,
    },

    /// String literal without closing quote on the same line.
    #[error(r#"Unterminated literal "{fragment}" at line {line_no}, column {col_no}!"#)]
    UnterminatedLiteral {
        fragment: String,
        line_no: usize,
        col_no: usize,
    },

    /// Integer constant that does not fit in 64 bits.
    #[error(r#"Constant "{fragment}" at line {line_no}, column {col_no} is out of range!"#)]
    NumberOutOfRange {
        fragment: String,
        line_no: usize,
        col_no: usize,
    },
}

impl LexerError {
    /// The offending piece of source text.
    pub fn fragment(&self) -> &str {
        match self {
            LexerError::UnrecognizedCharacter { fragment, .. }
            | LexerError::UnterminatedLiteral { fragment, .. }
            | LexerError::NumberOutOfRange { fragment, .. } => fragment,
        }
    }

    /// Line and column, both 1-based.
    pub fn position(&self) -> (usize, usize) {
        match self {
            LexerError::UnrecognizedCharacter {
                line_no, col_no, ..
            }
            | LexerError::UnterminatedLiteral {
                line_no, col_no, ..
            }
            | LexerError::NumberOutOfRange {
                line_no, col_no, ..
            } => (*line_no, *col_no),
        }
    }
}

/// Where a [`ParserError`] happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    statement: usize,
    kind: TokenKind,
    value: String,
    line_no: usize,
    col_no: usize,
}

impl ErrorContext {
    pub(crate) fn from_token(token: &Token, statement: usize) -> Self {
        Self {
            statement,
            kind: token.kind(),
            value: token.lexeme().to_string(),
            line_no: token.line_no(),
            col_no: token.col_no(),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::EndOfInput {
            write!(f, "{}", self.kind)?;
        } else {
            write!(f, r#"{} "{}""#, self.kind, self.value)?;
        }

        write!(
            f,
            " in statement {} (line {}, column {})",
            self.statement, self.line_no, self.col_no
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error from the [parser](crate::ast::Parser). Parsing aborts at the first one.
pub enum ParserError {
    /// A specific token was required.
    #[error("Expected {expected}, got {context}!")]
    UnexpectedToken {
        context: ErrorContext,
        expected: String,
    },

    /// No statement starts with this token.
    #[error("Unrecognized statement starting at {0}!")]
    UnrecognizedStatement(ErrorContext),

    /// No expression starts with this token.
    #[error("Unexpected expression at {0}!")]
    UnexpectedExpression(ErrorContext),

    /// Maximum nesting depth exceeded.
    #[error("Maximum parsing depth, {depth}, exceeded at {context}!")]
    MaxDepth { context: ErrorContext, depth: u64 },
}

impl ParserError {
    fn context(&self) -> &ErrorContext {
        match self {
            ParserError::UnexpectedToken { context, .. }
            | ParserError::MaxDepth { context, .. }
            | ParserError::UnrecognizedStatement(context)
            | ParserError::UnexpectedExpression(context) => context,
        }
    }

    /// Human readable description.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Kind of the token the parser failed on.
    pub fn token_kind(&self) -> TokenKind {
        self.context().kind
    }

    /// Text of the token the parser failed on.
    pub fn token_value(&self) -> &str {
        &self.context().value
    }

    /// 1-based index of the statement being parsed.
    pub fn position(&self) -> usize {
        self.context().statement
    }

    /// Line and column of the token the parser failed on.
    pub fn location(&self) -> (usize, usize) {
        let context = self.context();
        (context.line_no, context.col_no)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Finding of the [`SemanticAnalyzer`](crate::visitors::SemanticAnalyzer).
/// Diagnostics are collected; none of them stops the analysis.
pub enum SemanticDiagnostic {
    #[error("Duplicate function or class declaration: '{0}'.")]
    DuplicateDeclaration(String),

    #[error("Undeclared identifier: '{0}'.")]
    UndeclaredIdentifier(String),

    #[error("Call to undefined function: '{0}'.")]
    UndefinedFunction(String),

    #[error("Undeclared object: '{0}'.")]
    UndeclaredObject(String),

    #[error("Variable used before declaration: '{0}'.")]
    AssignmentBeforeDeclaration(String),

    #[error("'return' outside of a function.")]
    ReturnOutsideFunction,

    #[error("'break' outside of a loop.")]
    BreakOutsideLoop,
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Error from the [`Interpreter`](crate::visitors::Interpreter). Execution
/// stops at the first one.
pub enum RuntimeError {
    #[error("Undefined variable '{0}'!")]
    UndefinedVariable(String),

    #[error("Unsupported builtin call '{0}'!")]
    UnsupportedBuiltin(String),

    #[error("'{name}' of type {type_name} is not callable!")]
    NotCallable { name: String, type_name: &'static str },

    #[error("Unsupported operand type(s) for {operator}: {left} and {right}!")]
    UnsupportedOperands {
        operator: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("Bad operand type for unary {operator}: {operand}!")]
    UnsupportedOperand {
        operator: String,
        operand: &'static str,
    },

    #[error("Value of type {0} is not iterable!")]
    NotIterable(&'static str),

    #[error("Wrong number of arguments ({found}) for function '{name}', expected {expected}!")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid argument of type {type_name} for '{function}'!")]
    InvalidArgument {
        function: &'static str,
        type_name: &'static str,
    },

    #[error("Unhashable type: {0}!")]
    Unhashable(&'static str),

    #[error("Division by zero!")]
    DivisionByZero,

    #[error("Negative shift count!")]
    NegativeShift,

    #[error("{0}!")]
    IndexOutOfRange(String),

    #[error("Invalid literal for {target}(): '{value}'!")]
    Conversion { target: &'static str, value: String },

    #[error("Integer overflow in {0}!")]
    Overflow(String),

    #[error("Value of type {type_name} has no method '{method}'!")]
    UnknownMethod {
        method: String,
        type_name: &'static str,
    },

    #[error("'break' outside of a loop!")]
    BreakOutsideLoop,

    #[error("Maximum amount of loop iterations, {0}, exceeded!")]
    IterationLimit(u64),

    #[error("Maximum call depth, {0}, exceeded!")]
    DepthLimit(usize),
}

impl RuntimeError {
    /// Name of the failure kind, matched against `except` clauses.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::UndefinedVariable(_)
            | RuntimeError::UnsupportedBuiltin(_) => "NameError",
            RuntimeError::NotCallable { .. }
            | RuntimeError::UnsupportedOperands { .. }
            | RuntimeError::UnsupportedOperand { .. }
            | RuntimeError::NotIterable(_)
            | RuntimeError::ArgumentCount { .. }
            | RuntimeError::InvalidArgument { .. }
            | RuntimeError::Unhashable(_) => "TypeError",
            RuntimeError::DivisionByZero => "ZeroDivisionError",
            RuntimeError::Conversion { .. } | RuntimeError::NegativeShift => {
                "ValueError"
            }
            RuntimeError::IndexOutOfRange(_) => "IndexError",
            RuntimeError::Overflow(_) => "OverflowError",
            RuntimeError::UnknownMethod { .. } => "AttributeError",
            RuntimeError::BreakOutsideLoop => "RuntimeError",
            RuntimeError::IterationLimit(_) | RuntimeError::DepthLimit(_) => {
                "LimitExceeded"
            }
        }
    }

    /// Host-imposed limits can not be handled by interpreted code.
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self,
            RuntimeError::IterationLimit(_) | RuntimeError::DepthLimit(_)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
/// A [`RuntimeError`] together with the output produced before it happened.
#[error("{}: {}", .error.kind(), .error)]
pub struct RuntimeFailure {
    pub error: RuntimeError,
    pub output: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Error while turning source text into a [`Script`](crate::Script).
pub enum ScriptError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("Parser error: {0}")]
    Parser(#[from] ParserError),
}
