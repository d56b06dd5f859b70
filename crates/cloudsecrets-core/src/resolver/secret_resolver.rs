//! Host-side secret resolution
//!
//! Reads the `driver` field of a descriptor, routes it to the registered
//! driver and returns the decoded value.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value;
use thiserror::Error;

use crate::drivers::descriptor::parse_document;
use crate::drivers::{DriverError, DriverRegistry, SecretDriver};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::types::{ResolvedSecret, SecretFile};
use crate::{log_debug, log_info};

/// Errors raised while routing a descriptor
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("secrets: can't read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secrets: secret must contain string field 'driver'")]
    MissingDriver,

    #[error("secrets: driver '{0}' is not registered")]
    UnknownDriver(String),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Routes descriptors to drivers
pub struct SecretResolver {
    registry: DriverRegistry,
    logger: SharedLogger,
}

impl SecretResolver {
    pub fn new(registry: DriverRegistry) -> Self {
        Self {
            registry,
            logger: NoOpLogger::shared(),
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Driver key named by a descriptor
    pub fn driver_key(raw: &[u8]) -> ResolveResult<String> {
        let document = parse_document("secrets", raw)?;
        match document.get("driver") {
            Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
            _ => Err(ResolveError::MissingDriver),
        }
    }

    /// Registered driver for a key
    pub fn driver(&self, key: &str) -> ResolveResult<Arc<dyn SecretDriver>> {
        self.registry
            .get(key)
            .ok_or_else(|| ResolveError::UnknownDriver(key.to_string()))
    }

    /// Resolve a descriptor held in memory
    pub async fn resolve(&self, raw: &[u8]) -> ResolveResult<ResolvedSecret> {
        let key = Self::driver_key(raw)?;
        let driver = self.driver(&key)?;

        log_debug!(self.logger, "Resolving secret with driver '{}'", key);
        let (name, value) = driver.read(raw).await?;
        log_info!(self.logger, "Secret '{}' resolved via {}", name, key);

        Ok(ResolvedSecret {
            name,
            driver: key,
            value,
        })
    }

    /// Resolve a descriptor file
    ///
    /// Also returns the `SecretFile` handle used for editing.
    pub async fn resolve_file(&self, path: &Path) -> ResolveResult<(SecretFile, ResolvedSecret)> {
        let raw = read_file(path)?;
        let resolved = self.resolve(&raw).await?;
        let file = SecretFile::new(resolved.name.clone(), resolved.driver.clone(), path);
        Ok((file, resolved))
    }

    /// Resolve several files, stopping at the first failure
    pub async fn resolve_all(&self, paths: &[PathBuf]) -> ResolveResult<BTreeMap<String, ResolvedSecret>> {
        let mut secrets = BTreeMap::new();
        for path in paths {
            let (_, resolved) = self.resolve_file(path).await?;
            secrets.insert(resolved.name.clone(), resolved);
        }
        Ok(secrets)
    }

    /// Open a descriptor file in the editor of its driver
    ///
    /// Only the `name` and `driver` fields are parsed; the remote store is
    /// not contacted, so broken or unreachable secrets can still be fixed.
    pub async fn edit_file(&self, path: &Path) -> ResolveResult<SecretFile> {
        let raw = read_file(path)?;
        let key = Self::driver_key(&raw)?;
        let driver = self.driver(&key)?;
        let document = parse_document(&key, &raw)?;
        let name = match document.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => return Err(DriverError::MissingName { driver: key }.into()),
        };

        let file = SecretFile::new(name, key, path);
        driver.edit(&file).await?;
        Ok(file)
    }

    /// Push the `secret_data` of a descriptor file to its backend
    pub async fn push_file(&self, path: &Path) -> ResolveResult<()> {
        let raw = read_file(path)?;
        let key = Self::driver_key(&raw)?;
        self.driver(&key)?.push(&raw).await?;
        Ok(())
    }
}

fn read_file(path: &Path) -> ResolveResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| ResolveError::Io {
        path: path.to_path_buf(),
        source,
    })
}
