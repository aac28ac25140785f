//! Secret resolution over an ordered chain of backends
//!
//! An application declares where its secrets may live (the process
//! environment, a JSON document, a vault service, a fixed in-memory set)
//! and in which order those places are consulted. Callers then ask a single
//! [`CompositeSecretResolver`] for a secret by name without knowing which
//! backend ends up answering.
//!
//! # Resolution
//!
//! Backends are queried one after the other in registration order. The first
//! backend that produces a value wins; a backend that has no value or fails
//! internally is skipped so that a healthy fallback can still answer.
//!
//! ```
//! use secretchain::{Secret, SecretStoreBuilder};
//!
//! # tokio_test::block_on(async {
//! let resolver = SecretStoreBuilder::new()
//!     .add_environment_variables_with_prefix("MYAPP_DOCTEST_")
//!     .add_optional_json_file("/nonexistent/secretchain/secrets.json")
//!     .add_in_memory([("MySecret", Secret::new("123", "v1"))])
//!     .build();
//!
//! let secret = resolver.resolve("MySecret").await?;
//! assert_eq!(secret.expose(), "123");
//! assert_eq!(secret.version(), "v1");
//! # Ok::<(), secretchain::SecretError>(())
//! # }).unwrap();
//! ```
//!
//! # Configuration
//!
//! The chain can also be described in TOML and assembled through a
//! [`BackendRegistry`], see [`SecretStoreConfig`].

mod backends;
mod builder;
mod composite;
mod config;
mod registry;
mod types;

pub use backends::{
    EnvSecretBackend, InMemorySecretBackend, JSON_SECRET_VERSION, JsonFileSecretBackend,
    SecretDefinition,
};
pub use builder::SecretStoreBuilder;
pub use composite::CompositeSecretResolver;
pub use config::{BackendConfig, CONFIG_ENV_VAR, SecretStoreConfig};
pub use registry::{BackendFactory, BackendRegistry, parse_options};
pub use types::Secret;

use async_trait::async_trait;
use thiserror::Error;

/// Error types for secret resolution
#[derive(Debug, Error)]
pub enum SecretError {
    /// A caller supplied an unusable argument (empty name, absent backend)
    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument {
        /// Name of the offending argument
        argument: String,
        /// What was wrong with it
        message: String,
    },

    /// No backend produced a value for the secret
    #[error("Secret '{name}' not found: {}", not_found_reason(.attempted))]
    NotFound {
        /// Secret name
        name: String,
        /// Number of backends consulted, zero when the chain is empty
        attempted: usize,
    },

    /// A backend failed internally while looking up a secret
    #[error("Failed to resolve secret '{name}': {message}")]
    ResolutionFailed {
        /// Secret name
        name: String,
        /// Error message from the backend
        message: String,
    },

    /// The secret store could not be assembled from its configuration
    #[error("Invalid secret store configuration: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },
}

fn not_found_reason(attempted: &usize) -> String {
    match *attempted {
        0 => "no secret backends are configured to retrieve the secret from".to_string(),
        1 => "the configured secret backend does not contain the requested secret".to_string(),
        n => format!("none of the {n} configured secret backends contains the requested secret"),
    }
}

impl SecretError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    #[must_use]
    pub fn not_found(name: impl Into<String>, attempted: usize) -> Self {
        Self::NotFound {
            name: name.into(),
            attempted,
        }
    }

    /// Create a backend failure
    #[must_use]
    pub fn resolution_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this is the terminal "no backend had it" outcome
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this not-found error came from a chain with no backends at all
    #[must_use]
    pub const fn is_empty_chain(&self) -> bool {
        matches!(self, Self::NotFound { attempted: 0, .. })
    }
}

/// Reject names that can never identify a secret.
///
/// # Errors
///
/// Returns [`SecretError::InvalidArgument`] when `name` is empty.
pub fn validate_secret_name(name: &str) -> Result<(), SecretError> {
    if name.is_empty() {
        return Err(SecretError::invalid_argument(
            "name",
            "secret name must not be empty",
        ));
    }
    Ok(())
}

/// A place secrets can be looked up in.
///
/// Implementors report three distinct outcomes:
/// - `Ok(Some(secret))` when the backend holds the secret
/// - `Ok(None)` when it simply doesn't
/// - `Err(_)` when the lookup itself failed (network, permissions, bad data)
///
/// A [`CompositeSecretResolver`] treats the last two the same way and moves
/// on to the next backend, so implementors never need to swallow their own
/// errors.
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Look up a single secret by name.
    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError>;

    /// Short identifier used in diagnostics.
    ///
    /// Examples: `"env"`, `"memory"`, `"json"`, `"vault"`
    fn provider_name(&self) -> &'static str;

    /// Look up only the value of a secret.
    async fn get_raw_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
        Ok(self
            .get_secret(name)
            .await?
            .map(|secret| secret.expose().to_string()))
    }
}
