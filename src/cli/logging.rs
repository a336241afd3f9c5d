use super::config;
use anyhow::{bail, Result};
use log::{info, LevelFilter};
use std::fs;
use std::path::{Path, PathBuf};

static LOG_LEVELS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

/// Log file for `command`, named after the script it works on, if any.
pub fn log_file_name(command: &str, script: Option<&str>) -> String {
    let stem = script
        .and_then(|s| Path::new(s).file_stem())
        .map(|s| s.to_string_lossy().replace(|c: char| !c.is_alphanumeric(), "_"));

    match stem {
        Some(stem) if !stem.is_empty() => {
            format!("minipy-{}-{}.log", command, stem)
        }
        _ => format!("minipy-{}.log", command),
    }
}

/// Sets up logging to `<tmp>/minipy`. Only the pipeline stages log below
/// `Warn`; other crates are held at `Warn`.
pub fn setup_logger(
    verbosity: usize,
    command: &str,
    script: Option<&str>,
) -> Result<()> {
    let level = match LOG_LEVELS.get(verbosity) {
        Some(LevelFilter::Off) => return Ok(()),
        Some(lf) => *lf,
        None => bail!(
            "Verbosity must be between 0 and {}, not {}!",
            LOG_LEVELS.len() - 1,
            verbosity
        ),
    };

    let path: PathBuf = config::get_log_dir();

    fs::create_dir_all(&path)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            // minipy::ast::parser -> ast::parser
            let target = record.target();
            let stage = target.strip_prefix("minipy::").unwrap_or(target);

            out.finish(format_args!(
                "[{:.1}][{}][{}:{}] {}",
                record.level(),
                chrono::Local::now().format("%H:%M:%S.%3f"),
                stage,
                record.line().unwrap_or(0),
                message
            ));
        })
        .level(level.min(LevelFilter::Warn))
        .level_for("minipy", level)
        .chain(
            fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path.join(log_file_name(command, script)))?,
        )
        .apply()?;

    match script {
        Some(script) => info!("minipy {} {}", command, script),
        None => info!("minipy {}", command),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_name_test() {
        assert_eq!(log_file_name("list-scripts", None), "minipy-list-scripts.log");
        assert_eq!(
            log_file_name("run", Some("scripts/fibonacci.py")),
            "minipy-run-fibonacci.log"
        );
        assert_eq!(
            log_file_name("check", Some("my script.v2.py")),
            "minipy-check-my_script_v2.log"
        );
        assert_eq!(log_file_name("lex", Some("")), "minipy-lex.log");
    }
}
