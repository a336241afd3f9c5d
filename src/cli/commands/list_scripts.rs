use crate::cli::config;
use anyhow::Result;

pub(crate) struct ListScripts;

impl ListScripts {
    pub(crate) fn run() -> Result<()> {
        let scripts = config::get_all_scripts();

        if scripts.is_empty() {
            println!(
                "Couldn't find any scripts in the config directories or in \
                the current directory."
            );
        } else {
            println!("Scripts:");
        }

        for script in scripts {
            let name = script
                .file_stem()
                .map(std::ffi::OsStr::to_string_lossy)
                .unwrap_or_default();

            println!("{} ({})", name, script.display());
        }

        Ok(())
    }
}
