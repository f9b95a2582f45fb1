//! Application settings persisted next to the executable's working directory.

use crate::editor::style::EditorStyle;
use crate::error::{FlowError, Result};
use crate::history::DEFAULT_MAX_RECORDS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub style: EditorStyle,
    #[serde(default = "default_history_max_records")]
    pub history_max_records: usize,
    #[serde(default)]
    pub last_flow_name: Option<String>,
    #[serde(default = "default_flows_dir")]
    pub flows_dir: PathBuf,
    #[serde(default)]
    pub snap_to_grid: bool,
    #[serde(default = "default_grid_size")]
    pub grid_size: f32,
}

fn default_history_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

fn default_flows_dir() -> PathBuf {
    PathBuf::from("flows")
}

fn default_grid_size() -> f32 {
    20.0
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            style: EditorStyle::default(),
            history_max_records: default_history_max_records(),
            last_flow_name: None,
            flows_dir: default_flows_dir(),
            snap_to_grid: false,
            grid_size: default_grid_size(),
        }
    }
}

impl AppSettings {
    /// Read settings from `path`. A missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(FlowError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| FlowError::io(path, e))
    }
}
