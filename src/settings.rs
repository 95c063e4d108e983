// src/settings.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunable engine behavior, persisted per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Characters of trailing transcript handed to the rewrite collaborator
    pub context_window: usize,
    /// Unchanged-gap width below which revisions derived from a rewrite
    /// merge into one accept/reject unit
    pub coalesce_threshold: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            context_window: 4000,
            coalesce_threshold: 50,
        }
    }
}

/// Get the config directory path for the application
fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join("redline"))
        .context("could not determine config directory")
}

/// Get the settings file path
fn get_settings_file_path() -> Result<PathBuf> {
    get_config_dir().map(|p| p.join("settings.toml"))
}

/// Load settings from disk, return defaults if not present
pub fn load_settings() -> Result<EngineSettings> {
    load_settings_from(&get_settings_file_path()?)
}

pub fn load_settings_from(path: &Path) -> Result<EngineSettings> {
    if !path.exists() {
        return Ok(EngineSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("failed to parse settings in {}", path.display()))
}

/// Save settings to disk
pub fn save_settings(settings: &EngineSettings) -> Result<()> {
    let config_dir = get_config_dir()?;
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("failed to create {}", config_dir.display()))?;
    save_settings_to(settings, &config_dir.join("settings.toml"))
}

pub fn save_settings_to(settings: &EngineSettings, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(settings).context("failed to serialize settings")?;

    // Write atomically using a temporary sibling file
    let temp_path = path.with_extension("toml.tmp");
    fs::write(&temp_path, content)
        .and_then(|_| fs::rename(&temp_path, path))
        .with_context(|| format!("failed to write settings to {}", path.display()))?;

    Ok(())
}
