use scorehud_core::LineTemplate;
use scorehud_net::SortOrder;
use scorehud_server::{
    ConfigSource, EnableError, HudSettings, DEFAULT_ACTIVITY_COOLDOWN,
    DEFAULT_EXTERNAL_REFRESH_EVERY, DEFAULT_TITLE, DEFAULT_UPDATE_INTERVAL,
};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/scorehud.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoreHudConfig {
    /// Sidebar title; `§` colour codes are passed through.
    pub title: String,
    /// Server ticks between refreshes.
    pub update_interval: u64,
    /// Refreshes between bulk economy lookups.
    pub economy_refresh_every: u32,
    /// Ticks a subject's activity-triggered balance refresh stays throttled.
    pub activity_refresh_cooldown: u64,
    /// Client ordering of lines. Read at startup only.
    pub sort_order: SortOrder,
    pub lines: Vec<String>,
}

impl Default for ScoreHudConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            update_interval: DEFAULT_UPDATE_INTERVAL,
            economy_refresh_every: DEFAULT_EXTERNAL_REFRESH_EVERY,
            activity_refresh_cooldown: DEFAULT_ACTIVITY_COOLDOWN,
            sort_order: SortOrder::default(),
            lines: vec![
                "§7--------------------".to_string(),
                "§fName: §a{name}".to_string(),
                "§fHealth: §c{health}§7/§c{max_health}".to_string(),
                "§fMoney: §e{money}".to_string(),
                "§fTokens: §b{tokens}".to_string(),
                "§fOnline: §a{online}§7/§a{max_online}".to_string(),
                "§fTPS: §a{tps}".to_string(),
                "§7-------------------- ".to_string(),
            ],
        }
    }
}

impl ScoreHudConfig {
    /// Load configuration from an explicit path. Unlike most settings files
    /// a missing or broken HUD config is an error, not a fallback.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScoreHudConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default configuration to `path` unless a file is already
    /// there. Returns true if a file was written.
    pub fn write_default(path: &Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to_path(path)?;
        info!("Wrote default ScoreHud config to {}", path.display());
        Ok(true)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, toml).map_err(write_err)
    }

    /// Same checks the HUD applies on enable and reload.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_settings().validate().map_err(|err| match err {
            EnableError::Invalid(reason) => ConfigError::Invalid(reason),
            other => ConfigError::Invalid(other.to_string()),
        })
    }

    pub fn to_settings(&self) -> HudSettings {
        HudSettings {
            title: self.title.clone(),
            lines: LineTemplate::new(self.lines.iter().cloned()),
            update_interval: self.update_interval,
            economy_refresh_every: self.economy_refresh_every,
            activity_cooldown: self.activity_refresh_cooldown,
        }
    }
}

/// Re-reads the TOML file on every load, so `/scorehud reload` sees edits.
#[derive(Debug, Clone)]
pub struct TomlConfigSource {
    path: PathBuf,
}

impl TomlConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for TomlConfigSource {
    fn load(&self) -> anyhow::Result<HudSettings> {
        Ok(ScoreHudConfig::load_from_path(&self.path)?.to_settings())
    }
}
