use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ledger::types::RepeatPolicy;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct QuestlogConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub default_user: String,
    pub default_username: String,
}

/// The scoring rules the ledger, insights, and notification layers run on.
/// Every threshold the original hardcoded lives here instead.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RulesConfig {
    /// Daily XP needed for a day to count as a pass (and extend a streak).
    pub daily_goal: i64,
    /// Daily XP needed for a day to count as elite.
    pub elite_goal: i64,
    /// XP per level: level = total_xp / xp_per_level + 1.
    pub xp_per_level: i64,
    /// Whole days without a completion before the inactivity reminder fires.
    pub inactivity_days: i64,
    /// Whether the same quest may be completed more than once per day.
    pub completion_policy: RepeatPolicy,
}

impl Default for QuestlogConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8128,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_questlog_dir()
            .join("questlog.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            // Single-player identity used until an auth collaborator supplies one.
            default_user: "00000000-0000-0000-0000-000000000001".into(),
            default_username: "champion".into(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            daily_goal: 70,
            elite_goal: 100,
            xp_per_level: 500,
            inactivity_days: 2,
            completion_policy: RepeatPolicy::Repeatable,
        }
    }
}

/// Returns `~/.questlog/`
pub fn default_questlog_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".questlog")
}

/// Returns the default config file path: `~/.questlog/config.toml`
pub fn default_config_path() -> PathBuf {
    default_questlog_dir().join("config.toml")
}

impl QuestlogConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            QuestlogConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (QUESTLOG_DB, QUESTLOG_USER, QUESTLOG_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("QUESTLOG_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("QUESTLOG_USER") {
            self.storage.default_user = val;
        }
        if let Ok(val) = std::env::var("QUESTLOG_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
