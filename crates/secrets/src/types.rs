//! The resolved secret value object
//!
//! [`Secret`] wraps `secrecy::SecretString` so that:
//! - the value is zeroed from memory when dropped
//! - `Debug` and `Display` never print the value
//! - reading the value takes an explicit `.expose()` call

use secrecy::{ExposeSecret, SecretString};

/// A resolved secret: its value plus a backend-defined version tag.
///
/// Secrets are immutable. Two secrets with the same value and version are
/// equal and interchangeable.
///
/// # Example
///
/// ```
/// use secretchain::Secret;
///
/// let secret = Secret::new("my-password", "v3");
/// assert_eq!(secret.expose(), "my-password");
/// assert_eq!(secret.version(), "v3");
/// assert_eq!(format!("{secret}"), "[REDACTED]");
/// ```
#[derive(Clone)]
pub struct Secret {
    value: SecretString,
    version: String,
}

impl Secret {
    /// Create a secret with an explicit version tag.
    #[must_use]
    pub fn new(value: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            value: SecretString::from(value.into()),
            version: version.into(),
        }
    }

    /// Create a secret for a backend that has no notion of versions.
    ///
    /// The version tag is left empty.
    #[must_use]
    pub fn unversioned(value: impl Into<String>) -> Self {
        Self::new(value, String::new())
    }

    /// Expose the secret value for use.
    ///
    /// The caller must make sure the exposed value is not logged or
    /// persisted.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Backend-defined version tag, possibly empty.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the length of the secret value without exposing it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.value.expose_secret().len()
    }

    /// Check if the secret value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.expose() == other.expose()
    }
}

impl Eq for Secret {}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("value", &"[REDACTED]")
            .field("version", &self.version)
            .finish()
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}
