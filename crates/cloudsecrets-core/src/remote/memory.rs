//! In-memory secret manager

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{RemoteError, RemoteResult, SecretManagerClient};

/// Secret manager kept in process memory
///
/// Mirrors the Secret Manager data model closely enough for tests and dry
/// runs: secrets are created empty, versions are numbered from 1 and
/// `latest` resolves to the newest one.
///
/// # Example
///
/// ```
/// use cloudsecrets_core::remote::MemorySecretManager;
///
/// let store = MemorySecretManager::new();
/// store.insert("projects/acme/secrets/db-pass", "hunter2");
/// assert_eq!(store.version_count("projects/acme/secrets/db-pass"), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretManager {
    secrets: RwLock<HashMap<String, Vec<String>>>,
}

impl MemorySecretManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the secret if needed and append a version
    pub fn insert(&self, secret_path: &str, wire: &str) {
        self.secrets
            .write()
            .entry(secret_path.to_string())
            .or_default()
            .push(wire.to_string());
    }

    /// Number of versions stored for a secret (0 when absent)
    pub fn version_count(&self, secret_path: &str) -> usize {
        self.secrets.read().get(secret_path).map_or(0, Vec::len)
    }

    /// Newest version of a secret, bypassing path parsing
    pub fn latest(&self, secret_path: &str) -> Option<String> {
        self.secrets.read().get(secret_path).and_then(|v| v.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn split_version(version_path: &str) -> RemoteResult<(&str, &str)> {
    version_path
        .rsplit_once("/versions/")
        .ok_or_else(|| RemoteError::NotFound(version_path.to_string()))
}

#[async_trait]
impl SecretManagerClient for MemorySecretManager {
    fn name(&self) -> &str {
        "memory"
    }

    async fn access_secret(&self, version: &str) -> RemoteResult<String> {
        let (secret_path, version_id) = split_version(version)?;
        let secrets = self.secrets.read();
        let versions = secrets
            .get(secret_path)
            .ok_or_else(|| RemoteError::NotFound(version.to_string()))?;

        let found = match version_id {
            "latest" => versions.last(),
            n => n
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|idx| versions.get(idx)),
        };
        found
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(version.to_string()))
    }

    async fn create_secret(&self, project: &str, secret_id: &str) -> RemoteResult<String> {
        let secret_path = format!("projects/{}/secrets/{}", project, secret_id);
        let mut secrets = self.secrets.write();
        if secrets.contains_key(&secret_path) {
            return Err(RemoteError::AlreadyExists(secret_path));
        }
        secrets.insert(secret_path.clone(), Vec::new());
        Ok(secret_path)
    }

    async fn add_secret_version(&self, secret: &str, wire: &str) -> RemoteResult<()> {
        let mut secrets = self.secrets.write();
        let versions = secrets
            .get_mut(secret)
            .ok_or_else(|| RemoteError::NotFound(secret.to_string()))?;
        versions.push(wire.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "projects/acme/secrets/db-pass";

    #[tokio::test]
    async fn test_access_latest_and_numbered_versions() {
        let store = MemorySecretManager::new();
        store.insert(SECRET, "v1");
        store.insert(SECRET, "v2");

        assert_eq!(store.access_secret(&format!("{}/versions/latest", SECRET)).await.unwrap(), "v2");
        assert_eq!(store.access_secret(&format!("{}/versions/1", SECRET)).await.unwrap(), "v1");
        assert!(store
            .access_secret(&format!("{}/versions/3", SECRET))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(store
            .access_secret(&format!("{}/versions/0", SECRET))
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_access_missing_secret() {
        let store = MemorySecretManager::new();
        let err = store
            .access_secret("projects/acme/secrets/nope/versions/latest")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_then_add_version() {
        let store = MemorySecretManager::new();
        let path = store.create_secret("acme", "db-pass").await.unwrap();
        assert_eq!(path, SECRET);
        assert_eq!(store.version_count(SECRET), 0);

        // A freshly created secret has no versions to read yet
        assert!(store
            .access_secret(&format!("{}/versions/latest", SECRET))
            .await
            .is_err());

        store.add_secret_version(&path, "hunter2").await.unwrap();
        assert_eq!(store.latest(SECRET), Some("hunter2".to_string()));
    }

    #[tokio::test]
    async fn test_create_existing_secret_fails() {
        let store = MemorySecretManager::new();
        store.insert(SECRET, "v1");
        assert!(matches!(
            store.create_secret("acme", "db-pass").await,
            Err(RemoteError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_add_version_to_missing_secret() {
        let store = MemorySecretManager::new();
        assert!(store.add_secret_version(SECRET, "x").await.unwrap_err().is_not_found());
        assert!(store.is_empty());
    }
}
