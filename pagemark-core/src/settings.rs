use anyhow::Result;
use tracing::{info, warn};

use crate::kv::{KeyValueStore, StoredValue};
use crate::store::{HISTORY_KEY, LATEST_KEY};

pub const RESET_KEY: &str = "reset";
pub const BACKGROUND_KEY: &str = "background";
pub const HIDDEN_HOME_BAR_KEY: &str = "hiddenHomeBar";
pub const HIDDEN_STATUS_BAR_KEY: &str = "hiddenStatusBar";
pub const DIM_MENU_ICONS_KEY: &str = "dimMenuIcons";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    White,
    Clear,
}

impl Background {
    pub fn code(&self) -> &'static str {
        match self {
            Background::White => ".white",
            Background::Clear => ".clear",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            ".clear" => Background::Clear,
            _ => Background::White,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerSettings {
    pub background: Background,
    pub hidden_home_bar: bool,
    pub hidden_status_bar: bool,
    pub dim_menu_icons: bool,
}

impl ViewerSettings {
    pub fn read(kv: &dyn KeyValueStore) -> Self {
        Self {
            background: kv
                .text(BACKGROUND_KEY)
                .map(|code| Background::from_code(&code))
                .unwrap_or_default(),
            hidden_home_bar: kv.bool(HIDDEN_HOME_BAR_KEY),
            hidden_status_bar: kv.bool(HIDDEN_STATUS_BAR_KEY),
            dim_menu_icons: kv.bool(DIM_MENU_ICONS_KEY),
        }
    }

    pub fn write(&self, kv: &dyn KeyValueStore) -> Result<()> {
        kv.set(
            BACKGROUND_KEY,
            StoredValue::Text(self.background.code().to_owned()),
        )?;
        kv.set(HIDDEN_HOME_BAR_KEY, StoredValue::Bool(self.hidden_home_bar))?;
        kv.set(
            HIDDEN_STATUS_BAR_KEY,
            StoredValue::Bool(self.hidden_status_bar),
        )?;
        kv.set(DIM_MENU_ICONS_KEY, StoredValue::Bool(self.dim_menu_icons))?;
        Ok(())
    }

    pub fn menu_icon_alpha(&self) -> f64 {
        if self.dim_menu_icons {
            0.1
        } else {
            1.0
        }
    }

    /// Returns true when a pending reset ran; the in-memory history must then
    /// be reset as well.
    pub fn consume_reset(kv: &dyn KeyValueStore) -> bool {
        if !kv.bool(RESET_KEY) {
            return false;
        }
        if let Err(err) = kv.set(RESET_KEY, StoredValue::Bool(false)) {
            warn!(error = ?err, "failed to clear reset flag");
        }
        if let Err(err) = ViewerSettings::default().write(kv) {
            warn!(error = ?err, "failed to restore default settings");
        }
        for key in [HISTORY_KEY, LATEST_KEY] {
            if let Err(err) = kv.remove(key) {
                warn!(key, error = ?err, "failed to remove history record");
            }
        }
        if let Err(err) = kv.synchronize() {
            warn!(error = ?err, "failed to synchronize settings");
        }
        info!("settings and history reset");
        true
    }
}
