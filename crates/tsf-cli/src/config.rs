//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tsf_core::Rules;

/// Which notifications share a debounce timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebounceScope {
    /// One timer per reaction kind and document.
    #[default]
    Document,
    /// One timer per reaction kind for all documents.
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiescence window in milliseconds.
    pub window_ms: u64,
    pub scope: DebounceScope,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window_ms: 1000,
            scope: DebounceScope::Document,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Directory holding `YYYY/MM/DD.tsf` day files.
    pub project_root: Option<PathBuf>,

    /// Where report files are written.
    pub report_dir: PathBuf,

    pub debounce: DebounceConfig,

    /// `[categories]`, `[holidays]` and `[tasks]` tables.
    #[serde(flatten)]
    pub rules: Rules,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tsf.db"),
            project_root: None,
            report_dir: std::env::temp_dir(),
            debounce: DebounceConfig::default(),
            rules: Rules::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // TSF_DATABASE_PATH, TSF_DEBOUNCE__WINDOW_MS, ...
        figment = figment.merge(Env::prefixed("TSF_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tsf.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tsf"))
}

/// Returns the platform-specific data directory for tsf.
///
/// On Linux: `~/.local/share/tsf`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tsf"))
}
