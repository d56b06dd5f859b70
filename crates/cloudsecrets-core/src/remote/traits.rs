//! Remote secret store capability

use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a remote secret store
///
/// Drivers hand these back to the host unchanged, so callers can tell a
/// missing secret from a permission problem.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("secret already exists: {0}")]
    AlreadyExists(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("secret manager API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid secret payload: {0}")]
    InvalidPayload(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Get/put-by-name access to a remote secret store
///
/// Every name passed in is a fully qualified resource path, see
/// [`SecretRef`](super::SecretRef). Implementations hold no per-call state
/// and can be shared between drivers.
#[async_trait]
pub trait SecretManagerClient: Send + Sync {
    /// Short name of the backend, used in log lines
    fn name(&self) -> &str;

    /// Fetch the wire text of a secret version
    /// (`projects/P/secrets/S/versions/V`)
    async fn access_secret(&self, version: &str) -> RemoteResult<String>;

    /// Create an empty secret and return its resource path
    /// (`projects/P/secrets/S`)
    async fn create_secret(&self, project: &str, secret_id: &str) -> RemoteResult<String>;

    /// Add a new version holding `wire` to an existing secret
    async fn add_secret_version(&self, secret: &str, wire: &str) -> RemoteResult<()>;
}
