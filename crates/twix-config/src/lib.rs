use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use twix_security::FieldSpec;

/// Configuration for twix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Extension of container files picked up from a directory input.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Files processed concurrently.
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub redaction: RedactionConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// One row per measurement instead of the last one only.
    #[serde(default)]
    pub per_measurement: bool,

    /// Overrides the record table file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedactionConfig {
    /// Added to (or replacing) the built-in field catalog.
    #[serde(default)]
    pub extra_fields: Vec<FieldSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            jobs: default_jobs(),
            records: RecordsConfig::default(),
            redaction: RedactionConfig::default(),
        }
    }
}

fn default_extension() -> String {
    "dat".to_string()
}

fn default_jobs() -> usize {
    1
}

impl Config {
    /// Load config from `path`, or from the default location.
    ///
    /// The default location is created with a default config when missing;
    /// an explicit path must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::read(&path)
                } else {
                    let config = Config::default();
                    config.save(&path)?;
                    Ok(config)
                }
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        if config.jobs == 0 {
            anyhow::bail!("Invalid config {}: jobs must be at least 1", path.display());
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("org", "twix", "twix") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.twix/config.toml")
        }
    }
}
