use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tui::theme::ThemeConfig;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    /// Starting column count for a fresh grid. Common values are 20, 25,
    /// or 30. Default: 25
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            columns: default_columns(),
        }
    }
}

fn default_columns() -> usize {
    crate::grid::DEFAULT_COLUMNS
}

/// Returns the base fretpad config directory: ~/.fretpad/
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".fretpad"))
}

/// Returns the path to the `SQLite` database
pub fn db_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("fretpad.db"))
}

/// Returns the path to the log file
pub fn log_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("fretpad.log"))
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> Result<()> {
    let base = base_dir()?;
    fs::create_dir_all(&base).context("failed to create ~/.fretpad/")?;
    Ok(())
}

/// Load config from ~/.fretpad/config.toml (or return defaults if it doesn't exist)
pub fn load() -> Result<Config> {
    let path = base_dir()?.join("config.toml");
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}
