// Application settings
// Loaded from <config dir>/mandala/settings.json

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config_dir;

/// What to do when a loaded chart breaks the theme linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkCheck {
    /// Log each violation after loading (default)
    #[default]
    Warn,
    /// Load silently
    Off,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Sharing
    #[serde(rename = "share.baseUrl")]
    pub share_base_url: String,

    #[serde(rename = "share.paramKey")]
    pub share_param_key: String,

    // Display
    #[serde(rename = "labels.maxChars")]
    pub label_max_chars: usize,

    #[serde(rename = "display.cellWidth")]
    pub cell_width: usize,

    #[serde(rename = "display.showInactive")]
    pub show_inactive: bool,

    // Loading
    #[serde(rename = "load.linkCheck")]
    pub link_check: LinkCheck,

    // Saved charts
    #[serde(rename = "snapshots.file")]
    pub snapshots_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            share_base_url: String::from("https://mandala-chart.app/"),
            share_param_key: String::from("d"),
            label_max_chars: 8,
            cell_width: 14,
            show_inactive: false,
            link_check: LinkCheck::Warn,
            snapshots_file: None,  // None = <config dir>/saved.json
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file yields defaults; an
    /// unreadable or invalid one yields defaults and a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        warn!("error parsing {}: {}; using default settings", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write a commented default settings file if none exists yet.
    pub fn create_default_file(path: &Path) -> Result<bool, String> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let default_config = r#"{
    // Share links: base URL and the query parameter carrying the chart
    "share.baseUrl": "https://mandala-chart.app/",
    "share.paramKey": "d",

    // Region tab labels are cut to this many characters
    "labels.maxChars": 8,

    // Grid rendering
    "display.cellWidth": 14,
    "display.showInactive": false,

    // Charts from share links and imports: "warn" or "off"
    "load.linkCheck": "warn",

    // Saved charts file (null = saved.json next to this file)
    "snapshots.file": null
}
"#;

        fs::write(path, default_config).map_err(|e| e.to_string())?;
        Ok(true)
    }

    /// Where saved charts live.
    pub fn snapshots_path(&self) -> PathBuf {
        self.snapshots_file
            .clone()
            .unwrap_or_else(|| config_dir().join("saved.json"))
    }
}
