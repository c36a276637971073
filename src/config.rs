//! User configuration, read from `$XDG_CONFIG_HOME/mmdpad/config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mmdpad_export::ExportFormat;
use mmdpad_history::DEFAULT_MAX_HISTORY;
use mmdpad_keymap::ALWAYS_ACTIVE_KEYS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Undo steps kept per editing session
    pub max_history: usize,
    /// Keys that fire with ctrl even while typing
    pub always_active_keys: Vec<String>,
    /// Where diagrams and the log live (defaults to the XDG data dir)
    pub data_dir: Option<PathBuf>,
    /// Where exports are written (defaults to the working directory)
    pub export_dir: Option<PathBuf>,
    /// Preselected in the export menu and used by `mmdpad export`
    pub default_export_format: ExportFormat,
    pub tab_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            always_active_keys: ALWAYS_ACTIVE_KEYS.iter().map(|k| k.to_string()).collect(),
            data_dir: None,
            export_dir: None,
            default_export_format: ExportFormat::Mermaid,
            tab_width: 4,
        }
    }
}

/// mmdpad's directory under `$XDG_CONFIG_HOME` (or ~/.config)
pub fn config_dir() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config")
        });
    config_dir.join("mmdpad")
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_or_default(&config_dir().join("config.json"))
    }

    /// A missing file gives the defaults; a broken one is an error
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(mmdpad_core::default_data_dir)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
