use clap::{Args as ClapArgs, Parser, Subcommand};
use crate::{BlockMode, ExecutionOptions, Limits, ParserOptions, Scoping};

const DEFAULT_MAX_ITERATIONS: u64 = 1_000_000;
const DEFAULT_MAX_DEPTH: usize = 200;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Holds application-wide command line arguments.
pub struct Args {
    #[clap(short, long, parse(from_occurrences))]
    /// Sets the log level. Repeat for more detail.
    pub(crate) verbose: usize,

    #[clap(subcommand)]
    pub(crate) command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
/// Arguments shared by every command that reads a script.
pub struct ScriptArgs {
    /// Path to a script, or the name of a script in the config directories.
    pub(crate) script: String,

    #[clap(long)]
    /// Print the result as JSON.
    pub(crate) json: bool,

    #[clap(long)]
    /// Delimit blocks by indentation instead of by the next construct.
    pub(crate) indent_blocks: bool,
}

impl ScriptArgs {
    pub(crate) fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            block_mode: if self.indent_blocks {
                BlockMode::Indentation
            } else {
                BlockMode::Heuristic
            },
        }
    }
}

#[derive(ClapArgs, Debug, Clone, Copy)]
/// Interpreter settings.
pub struct RunArgs {
    #[clap(long)]
    /// Functions see the scope they were defined in.
    pub(crate) lexical: bool,

    #[clap(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    /// Maximum amount of loop iterations.
    pub(crate) max_iterations: u64,

    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH)]
    /// Maximum call depth.
    pub(crate) max_depth: usize,
}

impl RunArgs {
    pub(crate) fn execution_options(self) -> ExecutionOptions {
        ExecutionOptions {
            scoping: if self.lexical {
                Scoping::Lexical
            } else {
                Scoping::Dynamic
            },
            limits: Limits {
                max_iterations: Some(self.max_iterations),
                max_call_depth: Some(self.max_depth),
            },
        }
    }
}

#[derive(Subcommand, Debug)]
/// Holds per-subcommand command line arguments.
pub enum Command {
    /// Lists all scripts in the config directories.
    ListScripts,
    /// Prints the tokens of a script.
    Lex {
        #[clap(flatten)]
        script: ScriptArgs,
    },
    /// Parses and analyzes a script without running it.
    Check {
        #[clap(flatten)]
        script: ScriptArgs,
    },
    /// Runs a script.
    Run {
        #[clap(flatten)]
        script: ScriptArgs,

        #[clap(flatten)]
        run: RunArgs,
    },
    /// Prints the abstract syntax tree of a script.
    Ast {
        #[clap(flatten)]
        script: ScriptArgs,

        #[clap(long, conflicts_with = "json")]
        /// Print a GraphViz dot graph.
        dot: bool,
    },
}

impl Command {
    /// Name of the subcommand as typed on the command line.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::ListScripts => "list-scripts",
            Command::Lex { .. } => "lex",
            Command::Check { .. } => "check",
            Command::Run { .. } => "run",
            Command::Ast { .. } => "ast",
        }
    }

    pub(crate) fn script(&self) -> Option<&str> {
        match self {
            Command::ListScripts => None,
            Command::Lex { script }
            | Command::Check { script }
            | Command::Run { script, .. }
            | Command::Ast { script, .. } => Some(script.script.as_str()),
        }
    }
}

/// Parses arguments
pub(crate) fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};

    #[test]
    fn args_run_defaults_test() -> Result<()> {
        let args = Args::try_parse_from(["minipy", "-vv", "run", "x.py"])?;
        assert_eq!(args.verbose, 2);
        assert_eq!(args.command.name(), "run");
        assert_eq!(args.command.script(), Some("x.py"));

        match args.command {
            Command::Run { script, run } => {
                assert_eq!(script.script, "x.py");
                assert_eq!(script.parser_options().block_mode, BlockMode::Heuristic);

                let options = run.execution_options();
                assert_eq!(options.scoping, Scoping::Dynamic);
                assert_eq!(options.limits.max_iterations, Some(1_000_000));
                assert_eq!(options.limits.max_call_depth, Some(200));
            }
            other => bail!("Expected Command::Run, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn args_run_flags_test() -> Result<()> {
        let args = Args::try_parse_from([
            "minipy",
            "run",
            "--indent-blocks",
            "--lexical",
            "--max-depth",
            "5",
            "x",
        ])?;

        match args.command {
            Command::Run { script, run } => {
                assert_eq!(
                    script.parser_options().block_mode,
                    BlockMode::Indentation
                );

                let options = run.execution_options();
                assert_eq!(options.scoping, Scoping::Lexical);
                assert_eq!(options.limits.max_call_depth, Some(5));
            }
            other => bail!("Expected Command::Run, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn args_list_scripts_test() -> Result<()> {
        let args = Args::try_parse_from(["minipy", "list-scripts"])?;

        assert_eq!(args.command.name(), "list-scripts");
        assert_eq!(args.command.script(), None);
        Ok(())
    }
}
