//! Where stackvars keeps its files.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DATA_DIR_NAME: &str = ".stackvars";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Set once by the binary (`--data-dir`), read by everything else.
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Pin the data directory for the rest of the process. `None` pins the
/// default. Later calls are ignored.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let requested = custom_path.unwrap_or_else(default_data_dir);
    if let Err(requested) = DATA_DIR.set(requested) {
        tracing::debug!(
            requested = %requested.display(),
            current = %data_dir().display(),
            "Data directory already pinned"
        );
    }
}

fn default_data_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(DATA_DIR_NAME),
        None => PathBuf::from(DATA_DIR_NAME),
    }
}

/// The pinned data directory, or `~/.stackvars` when none was pinned.
pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

pub fn config_path() -> PathBuf {
    config_path_in(&data_dir())
}

fn config_path_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}
