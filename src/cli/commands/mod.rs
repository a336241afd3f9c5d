mod ast;
mod check;
mod lex;
mod list_scripts;
mod run;

pub(crate) use ast::Ast;
pub(crate) use check::Check;
pub(crate) use lex::Lex;
pub(crate) use list_scripts::ListScripts;
pub(crate) use run::Run;

use crate::cli::args::ScriptArgs;
use crate::cli::config;
use crate::Script;
use anyhow::Result;
use log::info;
use serde::Serialize;

/// Finds, reads and parses the script named in `args`.
pub(crate) fn load_script(args: &ScriptArgs) -> Result<Script> {
    let path = config::get_script(&args.script)?;
    info!("Loading script from {}", path.display());

    let source = std::fs::read_to_string(&path)?;

    Ok(Script::with_options(source, args.parser_options())?)
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}
