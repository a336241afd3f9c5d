use super::{load_script, print_json};
use crate::cli::args::ScriptArgs;
use anyhow::Result;

pub(crate) struct Ast;

impl Ast {
    pub(crate) fn run(args: &ScriptArgs, dot: bool) -> Result<()> {
        let script = load_script(args)?;

        if dot {
            println!("{}", script.dot());
            Ok(())
        } else if args.json {
            print_json(script.program())
        } else {
            println!("{:#?}", script.program());
            Ok(())
        }
    }
}
