/// Abstract Syntax Tree nodes
pub mod node;
/// Parser
pub mod parser;
/// Visitor Trait
pub mod visitor;

pub use parser::{BlockMode, Parser, ParserOptions};
pub use visitor::Visitor;
