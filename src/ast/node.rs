#![allow(missing_docs)]
use crate::ast::visitor::Visitor;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Root of the tree: the top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    body: Vec<Statement>,
}

impl Program {
    pub(crate) fn new(body: Vec<Statement>) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &[Statement] {
        &self.body
    }

    pub fn accept<S, E>(&self, visitor: &mut dyn Visitor<S, E>) -> S {
        visitor.visit_program(self)
    }
}

/// A `def` statement. Shared so a bound function does not copy its body.
#[derive(Debug, PartialEq, Serialize)]
pub struct FunctionDef {
    pub(crate) name: String,
    pub(crate) parameters: Vec<String>,
    pub(crate) body: Vec<Statement>,
}

impl FunctionDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn body(&self) -> &[Statement] {
        &self.body
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElifBlock {
    pub(crate) condition: Expression,
    pub(crate) body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptHandler {
    pub(crate) exception: Option<String>,
    pub(crate) alias: Option<String>,
    pub(crate) body: Vec<Statement>,
}

impl ExceptHandler {
    /// An untyped handler or `Exception` matches any failure kind.
    pub fn matches(&self, kind: &str) -> bool {
        match &self.exception {
            None => true,
            Some(name) => name == kind || name == "Exception",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportName {
    pub(crate) module: String,
    pub(crate) alias: Option<String>,
}

impl ImportName {
    /// The name an import binds: its alias, or the first dotted segment.
    pub fn bound_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.module.split('.').next().unwrap_or(&self.module),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node")]
pub enum Statement {
    FunctionDef(Rc<FunctionDef>),
    ClassDef {
        name: String,
        body: Vec<Statement>,
    },
    Import {
        names: Vec<ImportName>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    For {
        target: String,
        iterable: Expression,
        body: Vec<Statement>,
    },
    If {
        condition: Expression,
        body: Vec<Statement>,
        elif_blocks: Vec<ElifBlock>,
        else_body: Option<Vec<Statement>>,
    },
    Try {
        body: Vec<Statement>,
        handlers: Vec<ExceptHandler>,
        else_body: Option<Vec<Statement>>,
        finally_body: Option<Vec<Statement>>,
    },
    Pass,
    Break,
    Return {
        value: Option<Expression>,
    },
    Assignment {
        target: String,
        value: Expression,
    },
    AugmentedAssignment {
        target: String,
        operator: BinaryOperator,
        value: Expression,
    },
    Call {
        name: String,
        arguments: Vec<Expression>,
    },
    MethodCall {
        object: String,
        method: String,
        arguments: Vec<Expression>,
    },
}

impl Statement {
    pub fn accept<S, E>(&self, visitor: &mut dyn Visitor<S, E>) -> S {
        visitor.visit_statement(self)
    }

    /// Name of the variant, for logging and graph labels.
    pub fn name(&self) -> &'static str {
        match self {
            Statement::FunctionDef(_) => "FunctionDef",
            Statement::ClassDef { .. } => "ClassDef",
            Statement::Import { .. } => "Import",
            Statement::While { .. } => "While",
            Statement::For { .. } => "For",
            Statement::If { .. } => "If",
            Statement::Try { .. } => "Try",
            Statement::Pass => "Pass",
            Statement::Break => "Break",
            Statement::Return { .. } => "Return",
            Statement::Assignment { .. } => "Assignment",
            Statement::AugmentedAssignment { .. } => "AugmentedAssignment",
            Statement::Call { .. } => "Call",
            Statement::MethodCall { .. } => "MethodCall",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node")]
pub enum Expression {
    Identifier {
        name: String,
    },
    Constant {
        value: Constant,
    },
    Str {
        value: String,
        formatted: bool,
    },
    List {
        elements: Vec<Expression>,
    },
    Dict {
        pairs: Vec<(Expression, Expression)>,
    },
    Tuple {
        elements: Vec<Expression>,
    },
    UnaryOp {
        operator: UnaryOperator,
        operand: Box<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    Call {
        name: String,
        arguments: Vec<Expression>,
    },
}

impl Expression {
    pub fn accept<S, E>(&self, visitor: &mut dyn Visitor<S, E>) -> E {
        visitor.visit_expression(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "not")]
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "not",
        };

        write!(f, "{}", symbol)
    }
}

/// Binary operators. All share a single precedence level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "//")]
    FloorDivide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "**")]
    Power,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "<<")]
    ShiftLeft,
    #[serde(rename = ">>")]
    ShiftRight,
}

impl BinaryOperator {
    const ALL: [BinaryOperator; 21] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::FloorDivide,
        Self::Modulo,
        Self::Power,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
        Self::And,
        Self::Or,
        Self::In,
        Self::BitAnd,
        Self::BitOr,
        Self::BitXor,
        Self::ShiftLeft,
        Self::ShiftRight,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::FloorDivide => "//",
            Self::Modulo => "%",
            Self::Power => "**",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::In => "in",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
        }
    }

    /// Operators allowed between terms of an expression.
    pub(crate) fn from_expression_symbol(symbol: &str) -> Option<Self> {
        let operator = symbol.parse::<Self>().ok()?;

        match operator {
            Self::Power
            | Self::BitAnd
            | Self::BitOr
            | Self::BitXor
            | Self::ShiftLeft
            | Self::ShiftRight => None,
            other => Some(other),
        }
    }

    /// Operator of an augmented assignment, e.g. `+=`.
    pub(crate) fn from_augmented_symbol(symbol: &str) -> Option<Self> {
        let operator = symbol.strip_suffix('=')?.parse::<Self>().ok()?;

        match operator {
            Self::Add
            | Self::Subtract
            | Self::Multiply
            | Self::Divide
            | Self::FloorDivide
            | Self::Modulo
            | Self::Power
            | Self::BitAnd
            | Self::BitOr
            | Self::BitXor
            | Self::ShiftLeft
            | Self::ShiftRight => Some(operator),
            _ => None,
        }
    }
}

impl FromStr for BinaryOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|o| o.symbol() == s)
            .copied()
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
