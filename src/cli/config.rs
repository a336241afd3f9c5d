use anyhow::{anyhow, Result};
use log::debug;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

/// Extension of script files.
pub const SCRIPT_EXTENSION: &str = "py";

pub fn get_log_dir() -> PathBuf {
    std::env::temp_dir().join("minipy")
}

/// Directories searched for scripts by name, in order.
pub fn get_config_dirs() -> &'static [PathBuf] {
    static DIRS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
        let config = dirs::config_dir().map(|p| p.join("minipy"));
        let home = dirs::home_dir().map(|p| p.join(".minipy"));
        let cwd = std::env::current_dir().ok();

        let dirs = vec![config, home, cwd]
            .into_iter()
            .flatten()
            .filter(|p| p.is_dir())
            .collect();

        debug!("Valid config dirs:\n{:#?}", dirs);
        dirs
    });

    &DIRS
}

fn search_dir_for_extension<P: AsRef<Path>>(
    dir: &P,
    extension: &str,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(iter) = std::fs::read_dir(dir) {
        for entry in iter.flatten() {
            let path = entry.path();

            if path.is_file()
                && path.extension().map_or(false, |e| e == extension)
            {
                paths.push(path);
            }
        }
    }

    paths.sort();
    paths
}

/// Every script in the config directories and their `scripts` folders.
pub fn get_all_scripts() -> Vec<PathBuf> {
    let mut scripts = Vec::new();

    for dir in get_config_dirs() {
        scripts.extend(search_dir_for_extension(dir, SCRIPT_EXTENSION));
        scripts.extend(search_dir_for_extension(
            &dir.join("scripts"),
            SCRIPT_EXTENSION,
        ));
    }

    debug!("Found scripts:\n{:#?}", scripts);

    scripts
}

/// Resolves `name` as a path to an existing file, otherwise as
/// `<name>.py` in the config directories.
pub fn get_script(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);

    if path.is_file() {
        return Ok(dunce::canonicalize(path)?);
    }

    let filename = format!("{}.{}", name, SCRIPT_EXTENSION);

    let found = get_all_scripts()
        .into_iter()
        .find(|p| p.file_name().map_or(false, |f| f == filename.as_str()))
        .ok_or_else(|| anyhow!("Unable to find script {}", name))?;

    Ok(dunce::canonicalize(found)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    #[test]
    fn config_get_script_by_path_test() -> Result<()> {
        let path = get_script(file!())?;

        if !path.is_absolute() {
            bail!("Expected absolute path, got {}", path.display());
        }

        assert!(path.ends_with("config.rs"));
        Ok(())
    }

    #[test]
    fn config_missing_script_test() {
        let result = get_script("surely-there-is-no-script-with-this-name");

        assert!(result.is_err());
    }
}
