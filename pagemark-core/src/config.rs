use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "defaults.json";
const CONFIG_FILE: &str = "config.toml";

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("net", "pagemark", "pagemark")
        .ok_or_else(|| anyhow!("unable to resolve platform data directories"))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PagemarkConfig {
    pub storage: StorageConfig,
    pub autosave: AutosaveConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub poll_interval_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            directory: None,
        }
    }
}

impl PagemarkConfig {
    pub fn default_path(dirs: &ProjectDirs) -> PathBuf {
        dirs.config_dir().join(CONFIG_FILE)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config file {:?}", path))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        if config.autosave.poll_interval_ms == 0 {
            bail!("autosave.poll_interval_ms must be greater than zero");
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.autosave.poll_interval_ms)
    }

    pub fn storage_path(&self, dirs: &ProjectDirs) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| dirs.data_local_dir().join(SETTINGS_FILE))
    }

    pub fn log_directory(&self, dirs: &ProjectDirs) -> PathBuf {
        self.logging
            .directory
            .clone()
            .unwrap_or_else(|| dirs.data_local_dir().join("logs"))
    }
}
