mod dot;
mod interpreter;
mod semantic;

pub use dot::DotGenerator;
pub use interpreter::{
    Execution, ExecutionOptions, Flow, Interpreter, Limits, Scoping,
};
pub use semantic::SemanticAnalyzer;
