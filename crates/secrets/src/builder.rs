//! Fluent registration of secret backends

use crate::{
    CompositeSecretResolver, EnvSecretBackend, InMemorySecretBackend, JsonFileSecretBackend,
    Secret, SecretBackend,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Accumulates secret backends in the order they should be consulted.
///
/// The builder is only meant for the bootstrap phase of an application.
/// Once configured, [`build`](Self::build) hands a copy of the ordered list to
/// an immutable [`CompositeSecretResolver`]; later changes to the builder do
/// not affect resolvers already built.
///
/// Registration order is the only precedence rule. Registering the same
/// backend twice, or two backends that know the same secret names, is allowed.
///
/// # Example
///
/// ```
/// use secretchain::{InMemorySecretBackend, Secret, SecretStoreBuilder};
///
/// let resolver = SecretStoreBuilder::new()
///     .add_environment_variables()
///     .register(InMemorySecretBackend::new().with_secret("ApiKey", Secret::unversioned("k")))
///     .add_in_memory([("MySecret", Secret::new("123", "v1"))])
///     .build();
///
/// assert_eq!(resolver.provider_names(), vec!["env", "memory", "memory"]);
/// ```
#[derive(Clone, Default)]
pub struct SecretStoreBuilder {
    backends: Vec<Arc<dyn SecretBackend>>,
}

impl SecretStoreBuilder {
    /// Create a builder with no backends
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend to the end of the chain
    pub fn register<B: SecretBackend + 'static>(&mut self, backend: B) -> &mut Self {
        self.register_shared(Arc::new(backend))
    }

    /// Append an already shared backend to the end of the chain
    pub fn register_shared(&mut self, backend: Arc<dyn SecretBackend>) -> &mut Self {
        tracing::debug!(
            provider = backend.provider_name(),
            position = self.backends.len(),
            "Registered secret backend"
        );
        self.backends.push(backend);
        self
    }

    /// Append a backend reading secrets from environment variables
    pub fn add_environment_variables(&mut self) -> &mut Self {
        self.register(EnvSecretBackend::new())
    }

    /// Append a backend reading secrets from `{prefix}{name}` environment variables
    pub fn add_environment_variables_with_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.register(EnvSecretBackend::with_prefix(prefix))
    }

    /// Append a backend holding a fixed set of secrets
    pub fn add_in_memory<K, I>(&mut self, secrets: I) -> &mut Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Secret)>,
    {
        self.register(secrets.into_iter().collect::<InMemorySecretBackend>())
    }

    /// Append a backend reading a JSON document that must exist
    pub fn add_json_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.register(JsonFileSecretBackend::new(path))
    }

    /// Append a backend reading a JSON document that may be absent
    pub fn add_optional_json_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.register(JsonFileSecretBackend::optional(path))
    }

    /// Number of registered backends
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if no backend has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Provider names in registration order
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.provider_name()).collect()
    }

    /// Seal the current chain into a resolver
    ///
    /// Backends are not contacted here; unreachable backends only show up at
    /// resolution time.
    #[must_use]
    pub fn build(&self) -> CompositeSecretResolver {
        CompositeSecretResolver::new(self.backends.clone())
    }
}

impl std::fmt::Debug for SecretStoreBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretStoreBuilder")
            .field("providers", &self.provider_names())
            .finish()
    }
}
