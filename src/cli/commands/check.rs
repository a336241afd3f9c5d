use super::{load_script, print_json};
use crate::ast::node::Program;
use crate::cli::args::ScriptArgs;
use anyhow::{bail, Result};
use serde::Serialize;

#[derive(Serialize)]
struct CheckReport<'a> {
    tokens: usize,
    ast: &'a Program,
    diagnostics: Vec<String>,
}

pub(crate) struct Check;

impl Check {
    pub(crate) fn run(args: &ScriptArgs) -> Result<()> {
        let script = load_script(args)?;

        let diagnostics: Vec<String> =
            script.analyze().iter().map(ToString::to_string).collect();

        if args.json {
            print_json(&CheckReport {
                tokens: script.tokenized().total(),
                ast: script.program(),
                diagnostics: diagnostics.clone(),
            })?;
        } else if diagnostics.is_empty() {
            println!("No diagnostics.");
        } else {
            for diagnostic in &diagnostics {
                println!("{}", diagnostic);
            }
        }

        if !diagnostics.is_empty() {
            bail!("Script has {} diagnostic(s)", diagnostics.len());
        }

        Ok(())
    }
}
