//! Configuration for the icon theme engine

use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};

use super::error::{IconThemeError, Result};

/// Theme used when the configured one cannot be located
pub const BUILTIN_THEME_ID: &str = "vs-seti";

/// Resolutions run concurrently per preload batch
pub const DEFAULT_PRELOAD_BATCH_SIZE: usize = 5;

/// Configuration for the icon theme engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconThemeConfig {
    /// Id of the theme the host has selected
    pub active_theme: String,
    /// Built-in theme tried when `active_theme` is not installed
    pub fallback_theme: String,

    // Preload tuning
    /// Number of resolutions awaited together in one preload batch
    pub preload_batch_size: usize,

    // Cache policy
    /// Also cache fallback results for files nothing matched
    pub cache_negative_results: bool,

    // Discovery
    /// Directories holding installed extension packages
    pub extension_dirs: Vec<PathBuf>,
}

impl Default for IconThemeConfig {
    fn default() -> Self {
        Self {
            active_theme: BUILTIN_THEME_ID.to_string(),
            fallback_theme: BUILTIN_THEME_ID.to_string(),
            preload_batch_size: DEFAULT_PRELOAD_BATCH_SIZE,
            cache_negative_results: false,
            extension_dirs: default_extension_dirs(),
        }
    }
}

impl IconThemeConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `TAB_ICONS_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(theme) = std::env::var("TAB_ICONS_THEME") {
            if !theme.trim().is_empty() {
                config.active_theme = theme.trim().to_string();
            }
        }

        if let Ok(raw) = std::env::var("TAB_ICONS_PRELOAD_BATCH") {
            match raw.trim().parse::<usize>() {
                Ok(size) => config = config.with_preload_batch_size(size),
                Err(e) => log::warn!("Ignoring TAB_ICONS_PRELOAD_BATCH={:?}: {}", raw, e),
            }
        }

        if let Ok(raw) = std::env::var("TAB_ICONS_CACHE_MISSES") {
            config.cache_negative_results = matches!(raw.trim(), "1" | "true" | "yes");
        }

        config
    }

    /// Load a JSON configuration file; absent keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| IconThemeError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the active theme id
    pub fn with_active_theme(mut self, theme_id: impl Into<String>) -> Self {
        self.active_theme = theme_id.into();
        self
    }

    /// Set the fallback theme id
    pub fn with_fallback_theme(mut self, theme_id: impl Into<String>) -> Self {
        self.fallback_theme = theme_id.into();
        self
    }

    /// Set the preload batch size
    pub fn with_preload_batch_size(mut self, size: usize) -> Self {
        self.preload_batch_size = size.max(1);
        self
    }

    /// Cache fallback results as well as hits
    pub fn with_negative_caching(mut self, enabled: bool) -> Self {
        self.cache_negative_results = enabled;
        self
    }

    /// Replace the extension search directories
    pub fn with_extension_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.extension_dirs = dirs;
        self
    }
}

fn default_extension_dirs() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| vec![home.join(".vscode").join("extensions")])
        .unwrap_or_default()
}
