use anyhow::{Context, Result};
use buildscope_engine::ReconstructOptions;
use buildscope_types::UnknownDataBehavior;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::ColorChoice;

/// Resolve the settings file path based on priority:
/// 1. Explicit `--config` path
/// 2. BUILDSCOPE_CONFIG environment variable
/// 3. User config directory (`<config_dir>/buildscope/config.toml`)
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if let Some(env_path) = std::env::var_os("BUILDSCOPE_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|dir| dir.join("buildscope").join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub unknown_data_behavior: UnknownDataBehavior,

    #[serde(default = "default_true")]
    pub intern_strings: bool,

    #[serde(default)]
    pub color: ColorChoice,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unknown_data_behavior: UnknownDataBehavior::default(),
            intern_strings: true,
            color: ColorChoice::default(),
        }
    }
}

impl Config {
    /// A missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn reconstruct_options(&self) -> ReconstructOptions {
        ReconstructOptions {
            unknown_data_behavior: self.unknown_data_behavior,
            intern_strings: self.intern_strings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.intern_strings);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "unknown_data_behavior = \"throw_exception\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config.unknown_data_behavior,
            UnknownDataBehavior::ThrowException
        );
        assert!(config.intern_strings);
        assert_eq!(config.color, ColorChoice::Auto);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            unknown_data_behavior: UnknownDataBehavior::Ignore,
            intern_strings: false,
            color: ColorChoice::Never,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = PathBuf::from("/tmp/explicit.toml");
        assert_eq!(
            resolve_config_path(Some(&explicit)),
            Some(explicit.clone())
        );
    }
}
