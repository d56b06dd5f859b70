//! File-based settings (YAML)
//!
//! Supports user-level (~/.config/cloudsecrets/config.yaml) and
//! workspace-level (.config/cloudsecrets/config.yaml) files.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, ConfigResult};
use super::settings::Settings;

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/cloudsecrets/config.yaml)
    User,
    /// Workspace-level config (.config/cloudsecrets/config.yaml in the project root)
    Workspace,
    /// A file named explicitly by the caller
    Explicit,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
            ConfigLevel::Explicit => "explicit",
        }
    }
}

/// A settings file on disk
///
/// # Example
///
/// ```no_run
/// use cloudsecrets_core::config::SettingsFile;
///
/// let settings = SettingsFile::workspace("/path/to/project").load()?.with_env();
/// # Ok::<(), cloudsecrets_core::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    level: ConfigLevel,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
        }
    }

    /// A file the user pointed at; it must exist
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ConfigLevel::Explicit)
    }

    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("cloudsecrets").join("config.yaml"), ConfigLevel::User)
    }

    pub fn workspace(root: impl AsRef<Path>) -> Self {
        let path = root.as_ref().join(".config").join("cloudsecrets").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load settings
    ///
    /// A missing user or workspace file yields the defaults; a missing
    /// explicit file is an error.
    pub fn load(&self) -> ConfigResult<Settings> {
        if !self.exists() {
            return match self.level {
                ConfigLevel::Explicit => Err(ConfigError::NotFound(self.path.clone())),
                _ => Ok(Settings::default()),
            };
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write settings, creating parent directories
    pub fn save(&self, settings: &Settings) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(settings).map_err(ConfigError::Serialize)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
