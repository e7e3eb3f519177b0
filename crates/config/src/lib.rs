// Configuration loading

pub mod settings;
pub mod snapshots;

use std::path::PathBuf;

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "MANDALA_CONFIG_DIR";

/// Directory holding settings.json and saved charts.
/// `$MANDALA_CONFIG_DIR` if set, else `<config dir>/mandala`.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mandala")
}
