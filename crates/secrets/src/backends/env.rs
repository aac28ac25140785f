//! Environment variable secret backend

use crate::{Secret, SecretBackend, SecretError, parse_options};
use async_trait::async_trait;
use serde::Deserialize;
use std::env::VarError;

/// Options accepted under `kind = "env"` in a store configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
struct EnvBackendOptions {
    #[serde(default)]
    prefix: Option<String>,
}

/// Resolves secrets from environment variables
///
/// The secret name, optionally prefixed, is used as the variable name.
/// Environment variables carry no version, so resolved secrets have an empty
/// version tag.
#[derive(Debug, Clone, Default)]
pub struct EnvSecretBackend {
    prefix: Option<String>,
}

impl EnvSecretBackend {
    /// Create a backend reading variables named exactly like the secret
    #[must_use]
    pub const fn new() -> Self {
        Self { prefix: None }
    }

    /// Create a backend reading `{prefix}{name}`
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Build from a configuration table
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Configuration`] for unknown or mistyped options.
    pub fn from_options(options: &toml::Table) -> Result<Self, SecretError> {
        let options: EnvBackendOptions = parse_options("env", options)?;
        Ok(Self {
            prefix: options.prefix,
        })
    }

    /// The variable prefix, if any
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn variable_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        }
    }
}

#[async_trait]
impl SecretBackend for EnvSecretBackend {
    fn provider_name(&self) -> &'static str {
        "env"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        let variable = self.variable_name(name);
        match std::env::var(&variable) {
            Ok(value) => Ok(Some(Secret::unversioned(value))),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(SecretError::resolution_failed(
                name,
                format!("environment variable '{variable}' is not valid unicode"),
            )),
        }
    }
}
