//! Chain-of-responsibility secret resolution
//!
//! [`CompositeSecretResolver`] asks each backend in turn and returns the first
//! hit. A backend that misses or fails is skipped; its failure is only traced.

use crate::{Secret, SecretBackend, SecretError, validate_secret_name};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves secrets against an ordered, immutable list of backends.
///
/// Earlier backends shadow later ones: once a backend returns a secret, no
/// further backend is consulted. Backends are queried strictly one after the
/// other, never speculatively in parallel.
///
/// The resolver holds no mutable state, so a single instance (or cheap
/// clones of it) can serve concurrent callers for the whole process lifetime.
#[derive(Clone)]
pub struct CompositeSecretResolver {
    backends: Arc<[Arc<dyn SecretBackend>]>,
}

impl CompositeSecretResolver {
    /// Create a resolver over the given backends, in order
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn SecretBackend>>) -> Self {
        Self {
            backends: backends.into(),
        }
    }

    /// Create a resolver from a list whose entries may be absent
    ///
    /// # Errors
    ///
    /// Returns `SecretError::InvalidArgument` naming the first absent entry.
    /// Nothing is queried before the check.
    pub fn try_from_entries<I>(entries: I) -> Result<Self, SecretError>
    where
        I: IntoIterator<Item = Option<Arc<dyn SecretBackend>>>,
    {
        let backends = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                entry.ok_or_else(|| {
                    SecretError::invalid_argument(
                        "backends",
                        format!("none of the registered secret backends may be absent (entry {index} is)"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(backends))
    }

    /// Number of backends in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if the chain has no backends
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Provider names in resolution order
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.provider_name()).collect()
    }

    /// Resolve a secret from the first backend that has it
    ///
    /// # Errors
    ///
    /// - `SecretError::InvalidArgument` if `name` is empty; no backend is
    ///   consulted.
    /// - `SecretError::NotFound` if the chain is empty or every backend
    ///   missed or failed.
    pub async fn resolve(&self, name: &str) -> Result<Secret, SecretError> {
        validate_secret_name(name)?;

        if self.backends.is_empty() {
            return Err(SecretError::not_found(name, 0));
        }

        self.first_hit(name)
            .await
            .ok_or_else(|| SecretError::not_found(name, self.backends.len()))
    }

    /// Resolve only the value of a secret
    ///
    /// The returned string is a plain copy of the secret value; keep it out of
    /// logs.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_raw(&self, name: &str) -> Result<String, SecretError> {
        let secret = self.resolve(name).await?;
        Ok(secret.expose().to_string())
    }

    async fn first_hit(&self, name: &str) -> Option<Secret> {
        for (position, backend) in self.backends.iter().enumerate() {
            match backend.get_secret(name).await {
                Ok(Some(secret)) => {
                    tracing::debug!(
                        provider = backend.provider_name(),
                        position,
                        secret = %name,
                        "Secret resolved"
                    );
                    return Some(secret);
                }
                Ok(None) => {
                    tracing::trace!(
                        provider = backend.provider_name(),
                        position,
                        secret = %name,
                        "Secret backend doesn't contain secret"
                    );
                }
                Err(error) => {
                    tracing::trace!(
                        provider = backend.provider_name(),
                        position,
                        secret = %name,
                        error = %error,
                        "Secret backend failed, trying next backend"
                    );
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for CompositeSecretResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSecretResolver")
            .field("providers", &self.provider_names())
            .finish()
    }
}

/// A composite can sit inside another chain; exhausting it counts as a miss.
#[async_trait]
impl SecretBackend for CompositeSecretResolver {
    fn provider_name(&self) -> &'static str {
        "composite"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        validate_secret_name(name)?;
        Ok(self.first_hit(name).await)
    }
}
