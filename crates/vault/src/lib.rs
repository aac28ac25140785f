//! `HashiCorp` Vault backend for secretchain
//!
//! This crate provides a [`VaultSecretBackend`] reading KV v2 secrets, plus
//! the glue to plug it into a secret store:
//! - [`VaultStoreBuilderExt::add_vault`] for code-driven setup
//! - [`register`] for configuration-driven setup (`kind = "vault"`)

pub mod secrets;

// Re-export main types for convenience
pub use secrets::{VaultBackendConfig, VaultSecretBackend};

use secretchain::{BackendRegistry, SecretError, SecretStoreBuilder};
use std::sync::Arc;

/// Backend kind under which [`register`] installs the vault factory
pub const VAULT_KIND: &str = "vault";

/// Register the `vault` backend kind
pub fn register(registry: &mut BackendRegistry) {
    registry.register(VAULT_KIND, |options| {
        let config = VaultBackendConfig::from_options(options)?;
        Ok(Arc::new(VaultSecretBackend::new(config)?))
    });
}

/// Vault registration on [`SecretStoreBuilder`]
pub trait VaultStoreBuilderExt {
    /// Append a vault backend to the chain
    ///
    /// # Errors
    ///
    /// Returns an error if the Vault HTTP client cannot be initialized.
    fn add_vault(&mut self, config: VaultBackendConfig) -> Result<&mut Self, SecretError>;
}

impl VaultStoreBuilderExt for SecretStoreBuilder {
    fn add_vault(&mut self, config: VaultBackendConfig) -> Result<&mut Self, SecretError> {
        Ok(self.register(VaultSecretBackend::new(config)?))
    }
}
