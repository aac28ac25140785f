//! TOML description of a secret store
//!
//! ```toml
//! [[backends]]
//! kind = "env"
//! prefix = "APP_"
//!
//! [[backends]]
//! kind = "json"
//! path = "secrets.json"
//! optional = true
//!
//! [[backends]]
//! kind = "memory"
//! [backends.secrets.MySecret]
//! value = "123"
//! version = "v1"
//! ```
//!
//! Backends are registered in document order. Every key besides `kind` is
//! handed to the factory registered for that kind.

use crate::{BackendRegistry, CompositeSecretResolver, SecretError, SecretStoreBuilder};
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the path of the store configuration
pub const CONFIG_ENV_VAR: &str = "SECRETCHAIN_CONFIG";

/// An ordered list of backend declarations
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SecretStoreConfig {
    /// Backends in resolution order
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// One `[[backends]]` entry
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Registered backend kind, e.g. `"env"`
    pub kind: String,

    /// Remaining keys, interpreted by the backend factory
    #[serde(flatten)]
    pub options: toml::Table,
}

impl SecretStoreConfig {
    /// Parse a configuration document
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Configuration` for malformed TOML or entries
    /// without a `kind`.
    pub fn from_toml_str(source: &str) -> Result<Self, SecretError> {
        toml::from_str(source)
            .map_err(|e| SecretError::configuration(format!("failed to parse secret store configuration: {e}")))
    }

    /// Read and parse a configuration file
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Configuration` if the file cannot be read or
    /// parsed.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SecretError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            SecretError::configuration(format!("failed to read '{}': {e}", path.display()))
        })?;

        tracing::debug!(path = %path.display(), "Loaded secret store configuration");
        Self::from_toml_str(&source)
    }

    /// Read the configuration file named by [`CONFIG_ENV_VAR`]
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Configuration` if the variable is unset or the
    /// file cannot be read or parsed.
    pub async fn from_env() -> Result<Self, SecretError> {
        let path = std::env::var(CONFIG_ENV_VAR).map_err(|_| {
            SecretError::configuration(format!("{CONFIG_ENV_VAR} environment variable not set"))
        })?;
        Self::from_file(path).await
    }

    /// Create every declared backend, in order, and register it
    ///
    /// # Errors
    ///
    /// Fails on the first entry whose kind is unknown to `registry` or whose
    /// options are rejected by its factory. No backend is contacted.
    pub fn to_builder(&self, registry: &BackendRegistry) -> Result<SecretStoreBuilder, SecretError> {
        let mut builder = SecretStoreBuilder::new();
        for (index, entry) in self.backends.iter().enumerate() {
            let backend = registry.create(&entry.kind, &entry.options).map_err(|e| match e {
                SecretError::Configuration { message } => {
                    SecretError::configuration(format!("backends[{index}]: {message}"))
                }
                other => other,
            })?;
            builder.register_shared(backend);
        }
        Ok(builder)
    }

    /// Shorthand for [`to_builder`](Self::to_builder) followed by `build`
    ///
    /// # Errors
    ///
    /// Same as [`to_builder`](Self::to_builder).
    pub fn build_resolver(
        &self,
        registry: &BackendRegistry,
    ) -> Result<CompositeSecretResolver, SecretError> {
        Ok(self.to_builder(registry)?.build())
    }
}
