use crate::cli::args::{parse_args, Command};
use crate::cli::commands::{Ast, Check, Lex, ListScripts, Run};
use crate::cli::logging::setup_logger;
use anyhow::Result;

/// Main entrypoint for minipy
pub fn main() -> Result<()> {
    let args = parse_args();

    setup_logger(
        args.verbose,
        args.command.name(),
        args.command.script(),
    )?;

    match args.command {
        Command::ListScripts => ListScripts::run(),
        Command::Lex { script } => Lex::run(&script),
        Command::Check { script } => Check::run(&script),
        Command::Run { script, run } => Run::run(&script, run),
        Command::Ast { script, dot } => Ast::run(&script, dot),
    }
}
