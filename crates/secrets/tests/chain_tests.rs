//! End-to-end tests for chained secret resolution
//!
//! These mirror how an application wires its secret store: environment
//! variables first, then documents and vault-like services, then a static
//! fallback set.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use secretchain::{
    BackendRegistry, CompositeSecretResolver, EnvSecretBackend, InMemorySecretBackend, Secret,
    SecretBackend, SecretError, SecretStoreBuilder, SecretStoreConfig,
};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Stand-in for a vault client whose service is unreachable
struct UnreachableVault {
    calls: AtomicUsize,
}

impl UnreachableVault {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SecretBackend for UnreachableVault {
    fn provider_name(&self) -> &'static str {
        "vault"
    }

    async fn get_secret(&self, name: &str) -> Result<Option<Secret>, SecretError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SecretError::resolution_failed(
            name,
            "error sending request: connection refused",
        ))
    }
}

/// Backend that suspends before answering, to exercise concurrent callers
struct SlowBackend {
    delay: Duration,
    secret: Secret,
}

#[async_trait]
impl SecretBackend for SlowBackend {
    fn provider_name(&self) -> &'static str {
        "slow"
    }

    async fn get_secret(&self, _name: &str) -> Result<Option<Secret>, SecretError> {
        tokio::time::sleep(self.delay).await;
        Ok(Some(self.secret.clone()))
    }
}

#[tokio::test]
async fn environment_miss_falls_back_to_static_map() {
    temp_env::async_with_vars([("MySecret", None::<&str>)], async {
        let resolver = SecretStoreBuilder::new()
            .register(EnvSecretBackend::new())
            .add_in_memory([("MySecret", Secret::new("123", "v1"))])
            .build();

        let secret = resolver.resolve("MySecret").await.unwrap();
        assert_eq!(secret, Secret::new("123", "v1"));
    })
    .await;
}

#[tokio::test]
async fn environment_shadows_static_map() {
    temp_env::async_with_vars([("CHAIN_TEST_SHADOWED", Some("from-env"))], async {
        let resolver = SecretStoreBuilder::new()
            .add_environment_variables()
            .add_in_memory([("CHAIN_TEST_SHADOWED", Secret::new("from-map", "v1"))])
            .build();

        let secret = resolver.resolve("CHAIN_TEST_SHADOWED").await.unwrap();
        assert_eq!(secret.expose(), "from-env");
        assert_eq!(secret.version(), "");
    })
    .await;
}

#[tokio::test]
async fn first_registered_map_wins() {
    let resolver = SecretStoreBuilder::new()
        .add_in_memory([("A", Secret::new("x", "1"))])
        .add_in_memory([("A", Secret::new("y", "2"))])
        .build();

    assert_eq!(resolver.resolve("A").await.unwrap(), Secret::new("x", "1"));
}

#[tokio::test]
async fn empty_chain_is_not_found() {
    let resolver = SecretStoreBuilder::new().build();

    let err = resolver.resolve("Anything").await.unwrap_err();
    assert!(matches!(err, SecretError::NotFound { attempted: 0, .. }));
}

#[tokio::test]
async fn failing_vault_is_absorbed() {
    let vault = Arc::new(UnreachableVault::new());
    let resolver = SecretStoreBuilder::new()
        .register_shared(Arc::clone(&vault) as Arc<dyn SecretBackend>)
        .add_in_memory([("K", Secret::new("v", "1"))])
        .build();

    assert_eq!(resolver.resolve("K").await.unwrap(), Secret::new("v", "1"));
    assert_eq!(vault.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_name_never_reaches_backends() {
    let vault = Arc::new(UnreachableVault::new());
    let resolver = SecretStoreBuilder::new()
        .register_shared(Arc::clone(&vault) as Arc<dyn SecretBackend>)
        .add_in_memory([("K", Secret::new("v", "1"))])
        .build();

    let err = resolver.resolve("").await.unwrap_err();
    assert!(matches!(err, SecretError::InvalidArgument { .. }));
    assert!(matches!(
        resolver.resolve_raw("").await,
        Err(SecretError::InvalidArgument { .. })
    ));
    assert_eq!(vault.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn every_backend_failing_is_not_found() {
    let resolver = SecretStoreBuilder::new()
        .register(UnreachableVault::new())
        .register(UnreachableVault::new())
        .add_optional_json_file("/nonexistent/secretchain/secrets.json")
        .build();

    let err = resolver.resolve("K").await.unwrap_err();
    assert!(matches!(
        err,
        SecretError::NotFound { ref name, attempted: 3 } if name == "K"
    ));
}

#[tokio::test]
async fn malformed_json_document_is_skipped() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"{ this is not json").unwrap();

    let resolver = SecretStoreBuilder::new()
        .add_json_file(file.path())
        .add_in_memory([("Database:Password", Secret::new("fallback", "1"))])
        .build();

    let secret = resolver.resolve("Database:Password").await.unwrap();
    assert_eq!(secret.expose(), "fallback");
}

#[tokio::test]
async fn json_document_answers_nested_names() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(br#"{"Database": {"Password": "s3cret"}}"#)
        .unwrap();

    let resolver = SecretStoreBuilder::new()
        .register(UnreachableVault::new())
        .add_json_file(file.path())
        .build();

    let secret = resolver.resolve("Database:Password").await.unwrap();
    assert_eq!(secret, Secret::new("s3cret", "1.0.0"));
}

#[tokio::test]
async fn repeated_resolution_is_idempotent() {
    let resolver = SecretStoreBuilder::new()
        .register(UnreachableVault::new())
        .add_in_memory([("K", Secret::new("v", "1"))])
        .build();

    let first = resolver.resolve("K").await.unwrap();
    let second = resolver.resolve("K").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn absent_entry_rejected_before_any_query() {
    let vault = Arc::new(UnreachableVault::new());
    let entries: Vec<Option<Arc<dyn SecretBackend>>> =
        vec![Some(Arc::clone(&vault) as Arc<dyn SecretBackend>), None];

    let err = CompositeSecretResolver::try_from_entries(entries).unwrap_err();
    assert!(matches!(err, SecretError::InvalidArgument { .. }));
    assert_eq!(vault.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_resolver() {
    let resolver = SecretStoreBuilder::new()
        .register(UnreachableVault::new())
        .register(SlowBackend {
            delay: Duration::from_millis(20),
            secret: Secret::new("shared", "7"),
        })
        .build();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve("AnyName").await })
        })
        .collect();

    for result in futures::future::join_all(handles).await {
        let secret = result.unwrap().unwrap();
        assert_eq!(secret, Secret::new("shared", "7"));
    }
}

#[tokio::test]
async fn nested_composite_is_a_backend() {
    let primary = SecretStoreBuilder::new()
        .register(UnreachableVault::new())
        .add_in_memory([("Inner", Secret::new("i", "1"))])
        .build();

    let resolver = SecretStoreBuilder::new()
        .register(primary)
        .add_in_memory([("Outer", Secret::new("o", "1"))])
        .build();

    assert_eq!(resolver.provider_names(), vec!["composite", "memory"]);
    assert_eq!(resolver.resolve_raw("Inner").await.unwrap(), "i");
    assert_eq!(resolver.resolve_raw("Outer").await.unwrap(), "o");
    assert!(resolver.resolve("Neither").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn configured_chain_with_custom_backend_kind() {
    let mut registry = BackendRegistry::with_builtin();
    registry.register("unreachable", |_| Ok(Arc::new(UnreachableVault::new())));

    let config = SecretStoreConfig::from_toml_str(
        r#"
        [[backends]]
        kind = "unreachable"

        [[backends]]
        kind = "memory"
        [backends.secrets.OtherSecret]
        value = "1234"
        version = "lkj23-23 2-adsf-"
        "#,
    )
    .unwrap();

    let resolver = config.build_resolver(&registry).unwrap();
    let secret = resolver.resolve("OtherSecret").await.unwrap();
    assert_eq!(secret, Secret::new("1234", "lkj23-23 2-adsf-"));
}

#[tokio::test]
async fn in_memory_backend_registered_directly() {
    let backend = InMemorySecretBackend::new().with_secret("K", Secret::new("v", "1"));
    let resolver = SecretStoreBuilder::new().register(backend).build();

    assert_eq!(resolver.resolve_raw("K").await.unwrap(), "v");
}
