//! cloudsecrets core
//!
//! Secret backend drivers for infrastructure descriptors. A descriptor names
//! a secret and says where it lives; a driver fetches the value from its
//! backend and decodes it into a [`SecretValue`].
//!
//! ## Reading a secret
//!
//! ```rust,ignore
//! use cloudsecrets_core::{DriverRegistry, SecretResolver, Settings, register_builtin_drivers};
//!
//! let settings = Settings::default().with_env();
//! let mut registry = DriverRegistry::new();
//! register_builtin_drivers(&mut registry, &settings, CancellationToken::new(), logger)?;
//!
//! let resolver = SecretResolver::new(registry);
//! let secret = resolver.resolve(descriptor_bytes).await?;
//! ```
//!
//! ## Wire format
//!
//! Backends store one opaque string per secret. JSON objects decode to
//! [`SecretValue::Map`]; any other text is kept verbatim. See [`codec`].

pub mod types;
pub mod codec;
pub mod logging;
pub mod config;
pub mod editor;
pub mod remote;
pub mod drivers;
pub mod resolver;

// Re-export commonly used types
pub use types::{SecretValue, SecretMap, SecretFile, ResolvedSecret, CancellationToken};

pub use codec::{CodecError, CodecResult};

pub use logging::{Logger, SharedLogger, NoOpLogger, ConsoleLogger};

pub use config::{Settings, GcpSettings, SettingsFile, ConfigError};

pub use remote::{
    SecretManagerClient, RemoteError, RemoteResult, SecretRef,
    GcpSecretManager, MemorySecretManager,
};

pub use drivers::{
    SecretDriver, DriverError, DriverResult,
    GcpSecretManagerDriver, GCP_SECRETMANAGER_KEY,
    DriverRegistry, register_builtin_drivers,
};

pub use resolver::{SecretResolver, ResolveError};
