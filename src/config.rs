// User configuration loaded from YAML

use crate::repository::{FileRepository, Format};
use crate::stats::DEFAULT_TOP_AUTHORS;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Library file used when nothing else is configured
pub const DEFAULT_LIBRARY_FILE: &str = "library.json";

const CONFIG_DIR: &str = "bookshelf";
const CONFIG_FILE: &str = "bookshelf.yml";

/// Settings for the bookshelf CLI
///
/// Every key is optional in the file; missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Library file location
    pub library: PathBuf,
    /// Encoding of the library file; inferred from its extension when unset
    pub format: Option<Format>,
    /// Authors shown by `stats`
    pub top_authors: usize,
    /// Minimum level written to stderr
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library: PathBuf::from(DEFAULT_LIBRARY_FILE),
            format: None,
            top_authors: DEFAULT_TOP_AUTHORS,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/bookshelf/bookshelf.yml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// tried and a missing file there just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        config.log_level()?;
        Ok(config)
    }

    /// Parsed `log_level`
    pub fn log_level(&self) -> Result<Level> {
        self.log_level
            .parse()
            .map_err(|_| eyre!("Invalid log level: {} (expected error, warn, info, debug or trace)", self.log_level))
    }

    /// Repository for the configured library file
    pub fn repository(&self) -> FileRepository {
        match self.format {
            Some(format) => FileRepository::new(&self.library, format),
            None => FileRepository::at(&self.library),
        }
    }
}
