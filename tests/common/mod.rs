use anyhow::Result;
use minipy::{
    BlockMode, ExecutionOptions, Limits, Outcome, ParserOptions, Scoping,
    Script,
};
use std::fs;
use std::path::PathBuf;

#[allow(unused_must_use, dead_code)]
pub fn init_logger() {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message
            ));
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stderr())
        .apply();
}

#[allow(dead_code)]
pub fn script_dir() -> PathBuf {
    let mut path = PathBuf::from(file!());
    path.pop();
    path.pop();
    path.pop();
    path.push("testdata");
    path.push("script");

    path
}

#[allow(dead_code)]
pub fn get_script(filename: &str) -> Result<String> {
    Ok(fs::read_to_string(script_dir().join(filename))?)
}

#[allow(dead_code)]
pub fn options(block_mode: BlockMode) -> ParserOptions {
    ParserOptions { block_mode }
}

#[allow(dead_code)]
pub fn limited(scoping: Scoping) -> ExecutionOptions {
    ExecutionOptions {
        scoping,
        limits: Limits {
            max_iterations: Some(10_000),
            max_call_depth: Some(100),
        },
    }
}

#[allow(dead_code)]
pub fn run_script(
    filename: &str,
    block_mode: BlockMode,
    scoping: Scoping,
) -> Result<Outcome> {
    let script = Script::with_options(get_script(filename)?, options(block_mode))?;

    Ok(script.run(limited(scoping)))
}
