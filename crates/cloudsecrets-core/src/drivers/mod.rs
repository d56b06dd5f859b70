//! Secret backend drivers
//!
//! This module provides:
//! - `SecretDriver`: the contract every backend implements
//! - `descriptor`: parsing helpers shared by drivers
//! - `GcpSecretManagerDriver`: the `gcp_secretmanager` backend
//! - `DriverRegistry`: key-based lookup, filled by the host at startup

mod traits;
pub mod descriptor;
mod gcp_secretmanager;
mod registry;

pub use traits::{
    SecretDriver, DriverError, DriverResult, AuthoringError, AuthoringStage, ReadStage,
};
pub use gcp_secretmanager::{GcpSecretManagerDriver, GCP_SECRETMANAGER_KEY};
pub use registry::{DriverRegistry, RegistryError, register_builtin_drivers};
