use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Options controlling how EXIF payloads are spliced into containers.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_splice::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("exif-splice.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.webp.replace_existing_exif = false;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebP container behavior.
    pub webp: WebpConfig,
}

/// WebP-specific options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebpConfig {
    /// If `true`, every `EXIF` chunk already in the file is dropped before the new one is
    /// inserted, so the output carries exactly one. If `false`, the new chunk is inserted
    /// and existing ones are left in place.
    pub replace_existing_exif: bool,
}

impl Default for WebpConfig {
    fn default() -> Self {
        Self { replace_existing_exif: true }
    }
}

impl Config {
    /// Resolve the default config file path (next to the executable).
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("exif-splice.json"))
    }

    /// Parse config from a JSON string. Missing fields take their defaults.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("Failed to parse config")
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        Self::from_json(&contents)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_replace_existing_exif() {
        assert!(Config::default().webp.replace_existing_exif);
    }

    #[test]
    fn missing_fields_take_defaults() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
        assert_eq!(Config::from_json(r#"{"webp":{}}"#).unwrap(), Config::default());

        let config = Config::from_json(r#"{"webp":{"replace_existing_exif":false}}"#).unwrap();
        assert!(!config.webp.replace_existing_exif);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(Config::from_json("{ webp").is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.webp.replace_existing_exif = false;
        config.save(Some(&path)).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
