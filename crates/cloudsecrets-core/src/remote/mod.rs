//! Remote secret stores
//!
//! Drivers talk to their backend through the `SecretManagerClient` trait:
//! - `GcpSecretManager`: Secret Manager REST API
//! - `MemorySecretManager`: in-process store for tests and dry runs

mod traits;
mod reference;
mod memory;
mod gcp;

pub use traits::{SecretManagerClient, RemoteError, RemoteResult};
pub use reference::{SecretRef, ReferenceError};
pub use memory::MemorySecretManager;
pub use gcp::{GcpSecretManager, DEFAULT_ENDPOINT};
