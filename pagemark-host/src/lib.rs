//! Host-side wiring for the reading-position history: event and timer driven
//! saves, restoring a saved position onto the viewer, and process setup.

pub mod clock;
pub mod logging;
pub mod restore;
pub mod tracker;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use pagemark_core::{project_dirs, FileKeyValueStore, PagemarkConfig};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

pub use clock::{Clock, SystemClock};
pub use restore::{apply_defaults, restore, turn_page, RestoreOutcome, ViewerCommands};
pub use tracker::{Foreground, ReadingTracker, DEFAULT_POLL_INTERVAL};

/// A tracker backed by the on-disk settings file, with logging installed.
pub struct Host {
    pub config: PagemarkConfig,
    pub tracker: ReadingTracker<SystemClock>,
    _log_guard: WorkerGuard,
}

impl Host {
    /// Reads the config from the platform config directory, or from
    /// `config_path` when given.
    pub fn bootstrap(config_path: Option<&Path>) -> Result<Self> {
        let dirs = project_dirs()?;
        let config = match config_path {
            Some(path) => PagemarkConfig::load(path)?,
            None => PagemarkConfig::load(&PagemarkConfig::default_path(&dirs))?,
        };
        Self::with_config(config, &dirs)
    }

    pub fn with_config(config: PagemarkConfig, dirs: &ProjectDirs) -> Result<Self> {
        let storage_path = config.storage_path(dirs);
        let log_dir = config.log_directory(dirs);
        Self::open(config, &storage_path, &log_dir)
    }

    pub fn open(config: PagemarkConfig, storage_path: &Path, log_dir: &Path) -> Result<Self> {
        let log_guard =
            logging::init(&config.logging, log_dir).context("failed to initialise logging")?;
        let kv = FileKeyValueStore::open(storage_path.to_path_buf())?;
        info!(path = ?storage_path, "history storage opened");
        let tracker = ReadingTracker::with_config(Arc::new(kv), SystemClock, &config);
        Ok(Self {
            config,
            tracker,
            _log_guard: log_guard,
        })
    }
}
