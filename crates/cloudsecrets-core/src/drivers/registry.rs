//! Driver registry for routing descriptors by key

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use super::gcp_secretmanager::GcpSecretManagerDriver;
use super::traits::SecretDriver;
use crate::config::Settings;
use crate::logging::SharedLogger;
use crate::remote::GcpSecretManager;
use crate::types::CancellationToken;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("secrets: driver '{0}' is already registered")]
    DuplicateDriver(String),
}

/// Drivers known to the host, keyed by `SecretDriver::key`
///
/// Built once by the host's composition root and then only read.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cloudsecrets_core::config::Settings;
/// use cloudsecrets_core::drivers::{DriverRegistry, GcpSecretManagerDriver};
/// use cloudsecrets_core::remote::MemorySecretManager;
///
/// let mut registry = DriverRegistry::new();
/// let driver = GcpSecretManagerDriver::new(Arc::new(MemorySecretManager::new()), Settings::default());
/// registry.register(Arc::new(driver)).unwrap();
/// assert!(registry.contains("gcp_secretmanager"));
/// ```
#[derive(Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<String, Arc<dyn SecretDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver under its own key
    pub fn register(&mut self, driver: Arc<dyn SecretDriver>) -> Result<(), RegistryError> {
        let key = driver.key().to_string();
        if self.drivers.contains_key(&key) {
            return Err(RegistryError::DuplicateDriver(key));
        }
        self.drivers.insert(key, driver);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn SecretDriver>> {
        self.drivers.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.drivers.contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.keys())
            .finish()
    }
}

/// Register every built-in driver, wired to the real backends
pub fn register_builtin_drivers(
    registry: &mut DriverRegistry,
    settings: &Settings,
    interrupt: CancellationToken,
    logger: SharedLogger,
) -> Result<(), RegistryError> {
    let client = Arc::new(GcpSecretManager::from_settings(&settings.gcp));
    let gcp = GcpSecretManagerDriver::new(client, settings.clone())
        .with_interrupt(interrupt)
        .with_logger(logger);
    registry.register(Arc::new(gcp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::remote::MemorySecretManager;

    fn memory_driver() -> Arc<dyn SecretDriver> {
        Arc::new(GcpSecretManagerDriver::new(
            Arc::new(MemorySecretManager::new()),
            Settings::default(),
        ))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = DriverRegistry::new();
        assert!(registry.is_empty());

        registry.register(memory_driver()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("gcp_secretmanager").unwrap().key(), "gcp_secretmanager");
        assert!(registry.get("sops").is_none());
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut registry = DriverRegistry::new();
        registry.register(memory_driver()).unwrap();
        assert_eq!(
            registry.register(memory_driver()),
            Err(RegistryError::DuplicateDriver("gcp_secretmanager".to_string()))
        );
    }

    #[test]
    fn test_builtin_drivers() {
        let mut registry = DriverRegistry::new();
        register_builtin_drivers(
            &mut registry,
            &Settings::default(),
            CancellationToken::new(),
            NoOpLogger::shared(),
        )
        .unwrap();
        assert_eq!(registry.keys(), vec!["gcp_secretmanager"]);
        assert_eq!(format!("{:?}", registry), r#"DriverRegistry { drivers: ["gcp_secretmanager"] }"#);
    }
}
