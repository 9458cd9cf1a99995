use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cursor::WindowPolicy;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "CAMLABEL_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub scanner: ScannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Root holding the `P<id>` participant directories.
    #[serde(default)]
    pub images: Option<PathBuf>,

    /// Label schema, one label per line.
    #[serde(default)]
    pub schema: Option<PathBuf>,

    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Pick up where a previous session left off if `output` exists.
    #[serde(default = "default_resume")]
    pub resume: bool,
}

fn default_output() -> PathBuf {
    PathBuf::from("annotations.csv")
}

fn default_resume() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            images: None,
            schema: None,
            output: default_output(),
            resume: default_resume(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Photos shown at once.
    #[serde(default = "default_width")]
    pub width: usize,

    /// Position of the photo being annotated, counted from the left.
    #[serde(default = "default_active")]
    pub active: usize,

    #[serde(default)]
    pub policy: WindowPolicy,

    /// Clockwise rotation applied to every photo: 0, 90, 180 or 270.
    #[serde(default)]
    pub rotate: u16,

    #[serde(default = "default_image_preview")]
    pub image_preview: bool,
}

fn default_width() -> usize {
    5
}

fn default_active() -> usize {
    2
}

fn default_image_preview() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            active: default_active(),
            policy: WindowPolicy::default(),
            rotate: 0,
            image_preview: default_image_preview(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Parser threads; 0 means one per core.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// IANA zone the camera clocks were set to.
    #[serde(default = "default_source_timezone")]
    pub source_timezone: String,
}

fn default_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string()]
}

fn default_workers() -> usize {
    4
}

fn default_source_timezone() -> String {
    "Europe/London".to_string()
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            workers: default_workers(),
            source_timezone: default_source_timezone(),
        }
    }
}

impl Config {
    /// Load from `--config`, `$CAMLABEL_CONFIG` or the default location.
    ///
    /// A missing file at the default location is created with defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        {
            Some(path) => Self::load_from(&path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    let config = Config::default();
                    config.save_to(&path)?;
                    tracing::info!(path = %path.display(), "Wrote default config");
                    Ok(config)
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("camlabel")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[session]\nimages = \"/data/photos\"\n\n[display]\nwidth = 7\npolicy = \"strict\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.session.images, Some(PathBuf::from("/data/photos")));
        assert!(config.session.resume);
        assert_eq!(config.display.width, 7);
        assert_eq!(config.display.active, 2);
        assert_eq!(config.display.policy, WindowPolicy::Strict);
        assert_eq!(config.scanner.source_timezone, "Europe/London");
        assert_eq!(config.scanner.extensions, vec!["jpg", "jpeg"]);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.display.rotate = 90;
        config.scanner.workers = 0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.display.rotate, 90);
        assert_eq!(loaded.scanner.workers, 0);
        assert_eq!(loaded.session.output, PathBuf::from("annotations.csv"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\npolicy = \"sideways\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
