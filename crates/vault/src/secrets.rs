//! `HashiCorp` Vault secret backend with auto-negotiating dual-mode (HTTP + CLI)

use async_trait::async_trait;
use secretchain::{Secret, SecretBackend, SecretError, parse_options};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::process::Command;
use vaultrs::client::VaultClient;
use vaultrs::error::ClientError;

/// Configuration for a `HashiCorp` Vault backend
///
/// A secret named `name` is read from `{mount}/data/{base_path}/{name}` and
/// its `field` entry becomes the secret value.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VaultBackendConfig {
    /// Vault server address, falls back to `VAULT_ADDR`
    #[serde(default)]
    pub address: Option<String>,

    /// Vault token, falls back to `VAULT_TOKEN`
    #[serde(default)]
    pub token: Option<String>,

    /// Secret engine mount point (defaults to "secret")
    #[serde(default = "default_mount")]
    pub mount: String,

    /// Path prefix under the mount, may be empty
    #[serde(default)]
    pub base_path: String,

    /// Key within the secret to extract (defaults to "value")
    #[serde(default = "default_field")]
    pub field: String,
}

fn default_mount() -> String {
    "secret".to_string()
}

fn default_field() -> String {
    "value".to_string()
}

impl Default for VaultBackendConfig {
    fn default() -> Self {
        Self::new(default_mount())
    }
}

impl VaultBackendConfig {
    /// Create a config for the given mount with default field and no base path
    #[must_use]
    pub fn new(mount: impl Into<String>) -> Self {
        Self {
            address: None,
            token: None,
            mount: mount.into(),
            base_path: String::new(),
            field: default_field(),
        }
    }

    /// Set the server address
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the path prefix under the mount
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the key extracted from each secret
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Build from a configuration table
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Configuration`] for unknown or mistyped options.
    pub fn from_options(options: &toml::Table) -> Result<Self, SecretError> {
        parse_options(crate::VAULT_KIND, options)
    }

    /// Path of a secret relative to the mount
    #[must_use]
    pub fn secret_path(&self, name: &str) -> String {
        let base = self.base_path.trim_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{base}/{name}")
        }
    }

    /// Get the full KV v2 API path including mount point
    #[must_use]
    pub fn full_path(&self, name: &str) -> String {
        format!("{}/data/{}", self.mount, self.secret_path(name))
    }
}

impl std::fmt::Debug for VaultBackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultBackendConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("mount", &self.mount)
            .field("base_path", &self.base_path)
            .field("field", &self.field)
            .finish()
    }
}

/// Resolves secrets from `HashiCorp` Vault KV v2
///
/// Mode is auto-negotiated at construction:
/// - If an address and a token are known (config or `VAULT_ADDR` /
///   `VAULT_TOKEN`) → HTTP mode
/// - Otherwise → CLI mode (uses `vault` CLI)
///
/// A secret that does not exist, or lacks the configured field, is reported
/// as absent rather than as a failure.
pub struct VaultSecretBackend {
    config: VaultBackendConfig,
    client: Option<VaultClient>,
}

impl std::fmt::Debug for VaultSecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretBackend")
            .field("mode", &if self.can_use_http() { "http" } else { "cli" })
            .field("config", &self.config)
            .finish()
    }
}

impl VaultSecretBackend {
    /// Create a new Vault backend with auto-detected mode
    ///
    /// # Errors
    ///
    /// Returns an error if the Vault HTTP client cannot be initialized.
    pub fn new(config: VaultBackendConfig) -> Result<Self, SecretError> {
        let address = config
            .address
            .clone()
            .or_else(|| std::env::var("VAULT_ADDR").ok());
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("VAULT_TOKEN").ok());

        let client = match (address, token) {
            (Some(address), Some(token)) => Some(
                VaultClient::new(
                    vaultrs::client::VaultClientSettingsBuilder::default()
                        .address(address)
                        .token(token)
                        .build()
                        .map_err(|e| {
                            SecretError::configuration(format!("Failed to build Vault client: {e}"))
                        })?,
                )
                .map_err(|e| {
                    SecretError::configuration(format!("Failed to create Vault client: {e}"))
                })?,
            ),
            _ => None,
        };

        let mode = if client.is_some() { "http" } else { "cli" };
        tracing::debug!(
            mode,
            mount = %config.mount,
            "Vault secret backend initialized"
        );

        Ok(Self { config, client })
    }

    /// Backend configuration
    #[must_use]
    pub const fn config(&self) -> &VaultBackendConfig {
        &self.config
    }

    /// Check if this backend talks to the HTTP API
    #[must_use]
    pub const fn can_use_http(&self) -> bool {
        self.client.is_some()
    }

    /// Resolve using the Vault HTTP API
    async fn resolve_http(
        &self,
        client: &VaultClient,
        name: &str,
    ) -> Result<Option<Secret>, SecretError> {
        let path = self.config.secret_path(name);

        let data: HashMap<String, Value> =
            match vaultrs::kv2::read(client, &self.config.mount, &path).await {
                Ok(data) => data,
                Err(ClientError::APIError { code: 404, .. }) => return Ok(None),
                Err(e) => {
                    return Err(SecretError::resolution_failed(
                        name,
                        format!("Vault read error at '{}': {e}", self.config.full_path(name)),
                    ));
                }
            };

        let Some(value) = data.get(&self.config.field).and_then(render_field) else {
            return Ok(None);
        };

        let version = match vaultrs::kv2::read_metadata(client, &self.config.mount, &path).await {
            Ok(metadata) => metadata.current_version.to_string(),
            Err(e) => {
                tracing::trace!(
                    secret = %name,
                    path = %self.config.full_path(name),
                    error = %e,
                    "Failed to read Vault secret metadata, leaving version empty"
                );
                String::new()
            }
        };

        Ok(Some(Secret::new(value, version)))
    }

    /// Resolve using the vault CLI
    async fn resolve_cli(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        let mount = format!("-mount={}", self.config.mount);
        let path = self.config.secret_path(name);

        let mut command = Command::new("vault");
        command.args(["kv", "get", "-format=json", mount.as_str(), path.as_str()]);
        if let Some(address) = &self.config.address {
            command.env("VAULT_ADDR", address);
        }
        if let Some(token) = &self.config.token {
            command.env("VAULT_TOKEN", token);
        }

        let output = command.output().await.map_err(|e| {
            SecretError::resolution_failed(
                name,
                format!(
                    "Failed to execute vault CLI for '{}': {e}",
                    self.config.full_path(name)
                ),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No value found") {
                return Ok(None);
            }
            return Err(SecretError::resolution_failed(
                name,
                format!(
                    "vault CLI failed for '{}': {}",
                    self.config.full_path(name),
                    stderr.trim()
                ),
            ));
        }

        parse_cli_output(name, &output.stdout, &self.config.field)
    }
}

/// Text form of a KV field; structured and null fields have none
fn render_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Extract a secret from `vault kv get -format=json` output
fn parse_cli_output(name: &str, stdout: &[u8], field: &str) -> Result<Option<Secret>, SecretError> {
    let response: Value = serde_json::from_slice(stdout).map_err(|e| {
        SecretError::resolution_failed(name, format!("Invalid vault CLI output: {e}"))
    })?;

    let data = response.get("data");
    let Some(value) = data
        .and_then(|d| d.get("data"))
        .and_then(|fields| fields.get(field))
        .and_then(render_field)
    else {
        return Ok(None);
    };

    let version = data
        .and_then(|d| d.get("metadata"))
        .and_then(|m| m.get("version"))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();

    Ok(Some(Secret::new(value, version)))
}

#[async_trait]
impl SecretBackend for VaultSecretBackend {
    fn provider_name(&self) -> &'static str {
        "vault"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        // Try HTTP mode if available
        if let Some(client) = &self.client {
            return self.resolve_http(client, name).await;
        }

        // Fallback to CLI
        self.resolve_cli(name).await
    }
}
