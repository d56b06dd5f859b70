//! Secret descriptor files as seen by the host

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::value::SecretValue;

/// A secret descriptor file known to the host
///
/// `edit` works on the file path; `read` works on the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretFile {
    /// Secret name (the `name` field of the descriptor)
    pub name: String,
    /// Key of the driver that owns this descriptor
    pub driver: String,
    /// Path of the descriptor on disk
    pub filename: PathBuf,
}

impl SecretFile {
    pub fn new(name: impl Into<String>, driver: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
            filename: filename.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.filename
    }
}

/// Result of resolving a descriptor through its driver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSecret {
    /// Secret name from the descriptor
    pub name: String,
    /// Driver that produced the value
    pub driver: String,
    /// Decoded payload
    pub value: SecretValue,
}
