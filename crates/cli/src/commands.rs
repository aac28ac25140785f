//! Subcommand implementations
//!
//! Each command writes its result to the given writer; `main` passes a
//! locked stdout.

use crate::errors::CliError;
use secretchain::{BackendRegistry, CompositeSecretResolver, SecretStoreConfig};
use std::io::Write;
use std::path::Path;

/// Backend kinds available to configuration files
pub fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::with_builtin();
    secretchain_vault::register(&mut registry);
    registry
}

/// Load the configuration at `path` and build the resolver it describes
pub async fn load_resolver(path: Option<&Path>) -> Result<CompositeSecretResolver, CliError> {
    let path = path.ok_or(CliError::MissingConfig)?;
    let config = SecretStoreConfig::from_file(path).await?;
    let resolver = config.build_resolver(&registry())?;

    tracing::debug!(
        path = %path.display(),
        providers = ?resolver.provider_names(),
        "Secret store ready"
    );
    Ok(resolver)
}

/// Resolve `name` and print its value, followed by its version unless `raw`
pub async fn get(
    resolver: &CompositeSecretResolver,
    name: &str,
    raw: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let secret = resolver.resolve(name).await?;
    if raw {
        writeln!(out, "{}", secret.expose())?;
    } else {
        writeln!(out, "value: {}", secret.expose())?;
        writeln!(out, "version: {}", secret.version())?;
    }
    Ok(())
}

/// Print the configured providers in resolution order
pub fn backends(resolver: &CompositeSecretResolver, out: &mut impl Write) -> Result<(), CliError> {
    for (position, provider) in resolver.provider_names().into_iter().enumerate() {
        writeln!(out, "{position}\t{provider}")?;
    }
    Ok(())
}
