//! Secret backend factory registry
//!
//! Maps backend kind names (as written in a store configuration) to factories
//! that build a backend from its option table. Backend crates register their
//! own kinds so that the configuration loader never has to know about them.

use crate::{
    EnvSecretBackend, InMemorySecretBackend, JsonFileSecretBackend, SecretBackend, SecretError,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a backend from the option table of one `[[backends]]` entry
pub type BackendFactory =
    Arc<dyn Fn(&toml::Table) -> Result<Arc<dyn SecretBackend>, SecretError> + Send + Sync>;

/// Registry of secret backend factories
///
/// # Example
///
/// ```
/// use secretchain::{BackendRegistry, SecretBackend};
///
/// let registry = BackendRegistry::with_builtin();
/// let options: toml::Table = toml::from_str(r#"prefix = "APP_""#).unwrap();
///
/// let backend = registry.create("env", &options)?;
/// assert_eq!(backend.provider_name(), "env");
/// # Ok::<(), secretchain::SecretError>(())
/// ```
#[derive(Clone, Default)]
pub struct BackendRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl BackendRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding the backends shipped with this crate:
    /// `env`, `memory` and `json`
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register("env", |options| {
                Ok(Arc::new(EnvSecretBackend::from_options(options)?))
            })
            .register("memory", |options| {
                Ok(Arc::new(InMemorySecretBackend::from_options(options)?))
            })
            .register("json", |options| {
                Ok(Arc::new(JsonFileSecretBackend::from_options(options)?))
            });
        registry
    }

    /// Register a factory for a backend kind
    ///
    /// If a factory with the same kind already exists, it is replaced.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&toml::Table) -> Result<Arc<dyn SecretBackend>, SecretError> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }

    /// Check if a factory is registered for the given kind
    #[must_use]
    pub fn has(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Get all registered kinds, sorted
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Build a backend of the given kind
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Configuration` if no factory is registered for
    /// `kind`, or whatever the factory reports for invalid options.
    pub fn create(
        &self,
        kind: &str,
        options: &toml::Table,
    ) -> Result<Arc<dyn SecretBackend>, SecretError> {
        let factory = self.factories.get(kind).ok_or_else(|| {
            SecretError::configuration(format!(
                "unknown secret backend kind '{kind}' (known kinds: {})",
                self.kinds().join(", ")
            ))
        })?;

        factory(options)
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

/// Deserialize a backend's option table into its typed options
///
/// # Errors
///
/// Returns `SecretError::Configuration` naming the backend kind when the
/// table does not match `T`.
pub fn parse_options<T: DeserializeOwned>(
    kind: &str,
    options: &toml::Table,
) -> Result<T, SecretError> {
    toml::Value::Table(options.clone())
        .try_into()
        .map_err(|e| SecretError::configuration(format!("invalid options for '{kind}' backend: {e}")))
}
