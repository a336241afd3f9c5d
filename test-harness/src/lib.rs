#![warn(missing_docs)]
#![warn(clippy::pedantic)]
//! Runs tests against a directory of script fixtures, with a teardown that
//! runs even in the case of panic.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Runs a test with a setup and safe teardown.
///
/// # Errors
///
/// This returns any errors in the setup-, teardown- and test-function
///
/// # Panics
///
/// This code uses `std::panic::catch_unwind` to catch any panic during testing
/// so the teardown function can be called. The panic is resumed afterwards so
/// the original message is displayed to the user.
pub fn test_runner<S, T, F, X>(
    setup_function: S,
    teardown_function: T,
    test_function: F,
) -> Result<()>
where
    F: FnOnce(&X) -> Result<()> + std::panic::UnwindSafe,
    S: FnOnce() -> Result<X>,
    T: FnOnce(X) -> Result<()>,
    X: std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let setup_out = setup_function()?;

    let result = std::panic::catch_unwind(|| test_function(&setup_out));

    teardown_function(setup_out)?;

    match result {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// A scratch directory holding script files.
#[derive(Debug)]
pub struct ScriptFixture {
    root: PathBuf,
}

impl ScriptFixture {
    /// Creates an empty directory unique to `name` and this process.
    ///
    /// # Errors
    ///
    /// Fails if the directory already exists or can not be created.
    pub fn new(name: &str) -> Result<Self> {
        let root = std::env::temp_dir()
            .join("minipy-test-harness")
            .join(format!("{}-{}", name, std::process::id()));

        if root.exists() {
            bail!("Fixture directory {} already exists!", root.display());
        }

        std::fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Root of the fixture.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes `source` to `relative_path` under the root, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Fails on any IO error.
    pub fn add_script<P: AsRef<Path>>(
        &self,
        relative_path: P,
        source: &str,
    ) -> Result<PathBuf> {
        let path = self.root.join(relative_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, source)?;

        Ok(path)
    }

    /// Copies every file with `extension` in `source_dir` into `target_dir`
    /// under the root. Returns the amount of copied files.
    ///
    /// # Errors
    ///
    /// Fails on any IO error.
    pub fn copy_scripts<P: AsRef<Path>>(
        &self,
        source_dir: P,
        target_dir: &str,
        extension: &str,
    ) -> Result<usize> {
        let target = self.root.join(target_dir);
        std::fs::create_dir_all(&target)?;

        let mut copied = 0;

        for entry in std::fs::read_dir(source_dir)? {
            let path = entry?.path();

            if !path.is_file()
                || path.extension().map_or(true, |e| e != extension)
            {
                continue;
            }

            if let Some(file_name) = path.file_name() {
                std::fs::copy(&path, target.join(file_name))?;
                copied += 1;
            }
        }

        Ok(copied)
    }

    /// Removes the fixture from disk.
    ///
    /// # Errors
    ///
    /// Fails on any IO error.
    pub fn remove(self) -> Result<()> {
        std::fs::remove_dir_all(&self.root)?;

        Ok(())
    }
}

/// Runs `test_function` against a fresh [`ScriptFixture`] prepared by
/// `setup_function`. The fixture is removed afterwards, even on panic.
///
/// # Errors
///
/// This returns any errors in the setup-, teardown- and test-function
pub fn with_fixture<S, F>(
    name: &str,
    setup_function: S,
    test_function: F,
) -> Result<()>
where
    S: FnOnce(&ScriptFixture) -> Result<()>,
    F: FnOnce(&ScriptFixture) -> Result<()> + std::panic::UnwindSafe,
{
    test_runner(
        || {
            let fixture = ScriptFixture::new(name)?;
            setup_function(&fixture)?;
            Ok(fixture)
        },
        ScriptFixture::remove,
        test_function,
    )
}
