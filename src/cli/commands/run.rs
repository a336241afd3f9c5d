use super::{load_script, print_json};
use crate::cli::args::{RunArgs, ScriptArgs};
use crate::Outcome;
use anyhow::{bail, Result};

pub(crate) struct Run;

impl Run {
    pub(crate) fn run(args: &ScriptArgs, run_args: RunArgs) -> Result<()> {
        let script = load_script(args)?;
        let outcome = script.run(run_args.execution_options());

        if args.json {
            print_json(&outcome)?;
        } else {
            Run::print_outcome(&outcome);
        }

        match outcome {
            Outcome::Completed(_) => Ok(()),
            Outcome::Rejected { diagnostics } => {
                bail!("Script rejected with {} diagnostic(s)", diagnostics.len())
            }
            Outcome::Failed { kind, message, .. } => {
                bail!("{}: {}", kind, message)
            }
        }
    }

    fn print_outcome(outcome: &Outcome) {
        match outcome {
            Outcome::Completed(execution) => {
                for line in &execution.output {
                    println!("{}", line);
                }
            }
            Outcome::Rejected { diagnostics } => {
                for diagnostic in diagnostics {
                    eprintln!("{}", diagnostic);
                }
            }
            Outcome::Failed { output, .. } => {
                for line in output {
                    println!("{}", line);
                }
            }
        }
    }
}
