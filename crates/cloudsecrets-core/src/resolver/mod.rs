//! Secret resolution for the host
//!
//! `SecretResolver` routes descriptor documents to registered drivers.

mod secret_resolver;

pub use secret_resolver::{SecretResolver, ResolveError, ResolveResult};
