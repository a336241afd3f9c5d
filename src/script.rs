use crate::ast::node::Program;
use crate::ast::{Parser, ParserOptions};
use crate::error::{RuntimeFailure, ScriptError, SemanticDiagnostic};
use crate::lexer::{tokenize, Tokenized};
use crate::visitors::{
    DotGenerator, Execution, ExecutionOptions, Interpreter, SemanticAnalyzer,
};
use log::debug;
use serde::Serialize;

type Result<T> = std::result::Result<T, ScriptError>;

/// Outcome of [`Script::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The analyzer reported diagnostics; nothing was executed.
    Rejected { diagnostics: Vec<String> },
    /// Execution finished.
    Completed(Execution),
    /// Execution aborted. `output` holds what was printed before the failure.
    Failed {
        kind: &'static str,
        message: String,
        output: Vec<String>,
    },
}

impl Outcome {
    fn rejected(diagnostics: &[SemanticDiagnostic]) -> Self {
        Outcome::Rejected {
            diagnostics: diagnostics.iter().map(ToString::to_string).collect(),
        }
    }

    fn failed(failure: RuntimeFailure) -> Self {
        Outcome::Failed {
            kind: failure.error.kind(),
            message: failure.error.to_string(),
            output: failure.output,
        }
    }
}

/// Lexed and parsed source.
#[derive(Debug)]
pub struct Script {
    tokenized: Tokenized,
    program: Program,
}

impl Script {
    /// Lexes and parses `input` with the default [`ParserOptions`].
    pub fn new<S>(input: S) -> Result<Self>
    where
        S: AsRef<str>,
    {
        Self::with_options(input, ParserOptions::default())
    }

    /// Lexes and parses `input`.
    pub fn with_options<S>(input: S, options: ParserOptions) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let tokenized = tokenize(input.as_ref())?;
        let program =
            Parser::new(tokenized.tokens().to_vec(), options).parse()?;

        debug!(
            "Parsed script with {} top-level statement(s)",
            program.body().len()
        );

        Ok(Script { tokenized, program })
    }

    /// The tokens, ending with end-of-input, and their counts.
    pub fn tokenized(&self) -> &Tokenized {
        &self.tokenized
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn analyze(&self) -> Vec<SemanticDiagnostic> {
        SemanticAnalyzer::analyze(&self.program)
    }

    /// Analyzes the program and executes it only if there are no
    /// diagnostics.
    pub fn run(&self, options: ExecutionOptions) -> Outcome {
        let diagnostics = self.analyze();

        if !diagnostics.is_empty() {
            debug!("Script rejected with {} diagnostic(s)", diagnostics.len());
            return Outcome::rejected(&diagnostics);
        }

        match Interpreter::execute(&self.program, options) {
            Ok(execution) => Outcome::Completed(execution),
            Err(failure) => Outcome::failed(failure),
        }
    }

    /// The AST as a GraphViz dot graph.
    pub fn dot(&self) -> String {
        DotGenerator::create_ast_dot(&self.program)
    }
}
