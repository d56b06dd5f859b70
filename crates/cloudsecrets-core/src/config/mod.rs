//! Settings for drivers and remote clients
//!
//! Sources, later ones winning:
//! - built-in defaults
//! - a YAML file (`SettingsFile`: user, workspace or explicit path)
//! - environment variables (`Settings::with_env`)

mod error;
mod settings;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use settings::{Settings, GcpSettings, DEFAULT_EDITOR};
pub use file::{SettingsFile, ConfigLevel};
