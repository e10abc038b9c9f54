use anyhow::{anyhow, Context as _, Result};
use std::path::{Path, PathBuf};

const DATA_DIR: &str = ".wago";
const DATA_FILE: &str = "wago.json";

/// Where the ledger file lives: `--data-file` if given, else `$HOME/.wago/wago.json`.
///
/// The parent directory is created if it doesn't exist yet.
pub fn data_file(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) => path,
        None => default_data_file(std::env::var_os("HOME").map(PathBuf::from).as_deref())?,
    };
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    }
    Ok(path)
}

fn default_data_file(home: Option<&Path>) -> Result<PathBuf> {
    let home = home.ok_or_else(|| anyhow!("Couldn't determine home directory, HOME isn't set"))?;
    Ok(home.join(DATA_DIR).join(DATA_FILE))
}
