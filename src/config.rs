//! Configuration handling for the TUI

use crate::state::DEFAULT_EXPANDED_DEPTH;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Minimum time between two session checks
pub const DEFAULT_SESSION_CHECK_SECS: u64 = 60;

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Base URL of the inspection API
    pub api_base_url: Option<String>,
    /// Bearer token sent with every request
    pub access_token: Option<String>,
    /// Seconds between session checks
    pub session_check_interval_secs: Option<u64>,
    /// Sections shallower than this start expanded
    pub expanded_depth: Option<usize>,
}

impl TuiConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("io", "inspection", "inspection-tui")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the log file
    pub fn log_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("logs"))
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: TuiConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    pub fn session_check_interval(&self) -> Duration {
        Duration::from_secs(
            self.session_check_interval_secs
                .unwrap_or(DEFAULT_SESSION_CHECK_SECS),
        )
    }

    pub fn expanded_depth(&self) -> usize {
        self.expanded_depth.unwrap_or(DEFAULT_EXPANDED_DEPTH)
    }
}
