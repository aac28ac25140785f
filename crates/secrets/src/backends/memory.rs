//! In-memory secret backend

use crate::{Secret, SecretBackend, SecretError, parse_options};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// A secret as written in a store configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SecretDefinition {
    /// Secret value
    pub value: String,

    /// Version tag, empty when omitted
    #[serde(default)]
    pub version: String,
}

impl From<SecretDefinition> for Secret {
    fn from(definition: SecretDefinition) -> Self {
        Self::new(definition.value, definition.version)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InMemoryBackendOptions {
    #[serde(default)]
    secrets: HashMap<String, SecretDefinition>,
}

/// Resolves secrets from a fixed map
///
/// Lookups are exact-match on the secret name. The map is set up while the
/// backend is constructed and never changes afterwards.
#[derive(Clone, Default)]
pub struct InMemorySecretBackend {
    secrets: HashMap<String, Secret>,
}

impl InMemorySecretBackend {
    /// Create an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret, replacing any previous secret with the same name
    #[must_use]
    pub fn with_secret(mut self, name: impl Into<String>, secret: Secret) -> Self {
        self.secrets.insert(name.into(), secret);
        self
    }

    /// Build from a configuration table
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Configuration`] for unknown or mistyped options.
    pub fn from_options(options: &toml::Table) -> Result<Self, SecretError> {
        let options: InMemoryBackendOptions = parse_options("memory", options)?;
        Ok(options
            .secrets
            .into_iter()
            .map(|(name, definition)| (name, Secret::from(definition)))
            .collect())
    }

    /// Number of secrets held
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Check if the backend holds no secrets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Secret)> for InMemorySecretBackend {
    fn from_iter<I: IntoIterator<Item = (K, Secret)>>(iter: I) -> Self {
        Self {
            secrets: iter
                .into_iter()
                .map(|(name, secret)| (name.into(), secret))
                .collect(),
        }
    }
}

impl std::fmt::Debug for InMemorySecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySecretBackend")
            .field("names", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[async_trait]
impl SecretBackend for InMemorySecretBackend {
    fn provider_name(&self) -> &'static str {
        "memory"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        Ok(self.secrets.get(name).cloned())
    }
}
