//! JSON document secret backend

use crate::{Secret, SecretBackend, SecretError, parse_options};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

/// Version tag given to every secret read from a JSON document
pub const JSON_SECRET_VERSION: &str = "1.0.0";

/// Separator between nested sections in a secret name
const SECTION_SEPARATOR: char = ':';

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonFileBackendOptions {
    path: PathBuf,
    #[serde(default)]
    optional: bool,
}

/// Resolves secrets from a JSON document on disk
///
/// The document is read on the first lookup and kept for the lifetime of the
/// backend. Names address nested objects with `:` between sections, so
/// `Database:Password` reads `{"Database": {"Password": "..."}}`. Section
/// names are matched case-insensitively when there is no exact match, and
/// numeric sections index into arrays.
///
/// String leaves are returned verbatim, numbers and booleans as their text.
/// Objects, arrays and `null` count as "not present".
pub struct JsonFileSecretBackend {
    path: PathBuf,
    optional: bool,
    document: OnceCell<Value>,
}

impl JsonFileSecretBackend {
    /// Create a backend for a document that must exist
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            optional: false,
            document: OnceCell::new(),
        }
    }

    /// Create a backend that treats a missing document as empty
    #[must_use]
    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            optional: true,
            ..Self::new(path)
        }
    }

    /// Build from a configuration table
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::Configuration`] for unknown or mistyped options.
    pub fn from_options(options: &toml::Table) -> Result<Self, SecretError> {
        let options: JsonFileBackendOptions = parse_options("json", options)?;
        Ok(if options.optional {
            Self::optional(options.path)
        } else {
            Self::new(options.path)
        })
    }

    /// Path of the backing document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a missing document is tolerated
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    async fn document(&self, name: &str) -> Result<&Value, SecretError> {
        self.document.get_or_try_init(|| self.load(name)).await
    }

    async fn load(&self, name: &str) -> Result<Value, SecretError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && self.optional => {
                tracing::debug!(
                    path = %self.path.display(),
                    "Optional JSON secret document not found, treating as empty"
                );
                return Ok(Value::Object(serde_json::Map::new()));
            }
            Err(e) => {
                return Err(SecretError::resolution_failed(
                    name,
                    format!("Failed to read '{}': {e}", self.path.display()),
                ));
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            SecretError::resolution_failed(
                name,
                format!("Invalid JSON in '{}': {e}", self.path.display()),
            )
        })
    }
}

fn child<'a>(node: &'a Value, section: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(section).or_else(|| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(section))
                .map(|(_, value)| value)
        }),
        Value::Array(items) => section
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    }
}

fn lookup(document: &Value, name: &str) -> Option<String> {
    let leaf = name
        .split(SECTION_SEPARATOR)
        .try_fold(document, |node, section| child(node, section))?;

    match leaf {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl std::fmt::Debug for JsonFileSecretBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileSecretBackend")
            .field("path", &self.path)
            .field("optional", &self.optional)
            .field("loaded", &self.document.initialized())
            .finish()
    }
}

#[async_trait]
impl SecretBackend for JsonFileSecretBackend {
    fn provider_name(&self) -> &'static str {
        "json"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        let document = self.document(name).await?;
        Ok(lookup(document, name).map(|value| Secret::new(value, JSON_SECRET_VERSION)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_document(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_lookup_flat_and_nested() {
        let document = json!({
            "ApiKey": "abc",
            "Database": { "Password": "p@ss", "Port": 5432, "Tls": true },
            "Hosts": ["a.example", "b.example"],
            "Empty": null
        });

        assert_eq!(lookup(&document, "ApiKey"), Some("abc".to_string()));
        assert_eq!(lookup(&document, "Database:Password"), Some("p@ss".to_string()));
        assert_eq!(lookup(&document, "Database:Port"), Some("5432".to_string()));
        assert_eq!(lookup(&document, "Database:Tls"), Some("true".to_string()));
        assert_eq!(lookup(&document, "Hosts:1"), Some("b.example".to_string()));
        assert_eq!(lookup(&document, "Hosts:7"), None);
        assert_eq!(lookup(&document, "Empty"), None);
        assert_eq!(lookup(&document, "Database"), None);
        assert_eq!(lookup(&document, "Missing:Deeper"), None);
    }

    #[test]
    fn test_lookup_case_insensitive_fallback() {
        let document = json!({ "Database": { "Password": "p@ss" }, "key": "lower", "KEY": "upper" });

        assert_eq!(lookup(&document, "database:password"), Some("p@ss".to_string()));
        assert_eq!(lookup(&document, "KEY"), Some("upper".to_string()));
        assert_eq!(lookup(&document, "key"), Some("lower".to_string()));
    }

    #[tokio::test]
    async fn test_get_secret_from_file() {
        let file = write_document(r#"{"MySecret": "123", "Nested": {"Inner": "456"}}"#);
        let backend = JsonFileSecretBackend::new(file.path());

        let secret = backend.get_secret("MySecret").await.unwrap().unwrap();
        assert_eq!(secret.expose(), "123");
        assert_eq!(secret.version(), JSON_SECRET_VERSION);

        let nested = backend.get_secret("Nested:Inner").await.unwrap().unwrap();
        assert_eq!(nested.expose(), "456");

        assert!(backend.get_secret("Unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_is_loaded_once() {
        let file = write_document(r#"{"MySecret": "first"}"#);
        let backend = JsonFileSecretBackend::new(file.path());

        let before = backend.get_secret("MySecret").await.unwrap().unwrap();
        std::fs::write(file.path(), r#"{"MySecret": "second"}"#).unwrap();
        let after = backend.get_secret("MySecret").await.unwrap().unwrap();

        assert_eq!(before, after);
        assert_eq!(after.expose(), "first");
    }

    #[tokio::test]
    async fn test_missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileSecretBackend::new(dir.path().join("absent.json"));

        let result = backend.get_secret("Anything").await;
        assert!(matches!(result, Err(SecretError::ResolutionFailed { .. })));
    }

    #[tokio::test]
    async fn test_missing_optional_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileSecretBackend::optional(dir.path().join("absent.json"));

        assert!(backend.is_optional());
        assert!(backend.get_secret("Anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_document_is_retried() {
        let file = write_document("{ not json");
        let backend = JsonFileSecretBackend::new(file.path());

        let result = backend.get_secret("MySecret").await;
        assert!(matches!(result, Err(SecretError::ResolutionFailed { .. })));

        std::fs::write(file.path(), r#"{"MySecret": "fixed"}"#).unwrap();
        let secret = backend.get_secret("MySecret").await.unwrap().unwrap();
        assert_eq!(secret.expose(), "fixed");
    }

    #[test]
    fn test_from_options() {
        let options: toml::Table =
            toml::from_str("path = \"/etc/app/secrets.json\"\noptional = true").unwrap();
        let backend = JsonFileSecretBackend::from_options(&options).unwrap();
        assert_eq!(backend.path(), Path::new("/etc/app/secrets.json"));
        assert!(backend.is_optional());
    }

    #[test]
    fn test_from_options_requires_path() {
        let result = JsonFileSecretBackend::from_options(&toml::Table::new());
        assert!(matches!(result, Err(SecretError::Configuration { .. })));
    }
}
