//! Built-in secret backends
//!
//! These backends need nothing beyond the standard runtime:
//!
//! - [`EnvSecretBackend`] - Environment variables
//! - [`InMemorySecretBackend`] - A fixed set of secrets held in memory
//! - [`JsonFileSecretBackend`] - A JSON document on disk
//!
//! Additional backends are available via separate crates:
//!
//! - `vault` - HashiCorp Vault KV v2 (secretchain-vault crate)

mod env;
mod json;
mod memory;

pub use env::EnvSecretBackend;
pub use json::{JSON_SECRET_VERSION, JsonFileSecretBackend};
pub use memory::{InMemorySecretBackend, SecretDefinition};
