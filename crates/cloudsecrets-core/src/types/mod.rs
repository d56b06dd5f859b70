//! Core types shared by drivers, stores and the resolver

mod value;
mod secret;
mod cancellation;

pub use value::{SecretValue, SecretMap};
pub use secret::{SecretFile, ResolvedSecret};
pub use cancellation::CancellationToken;
