use std::collections::HashMap;
use std::sync::Arc;

use super::session::{FileTokenStore, MemoryTokenStore, SessionError, TokenStore};

/// Backend-agnostic token storage configuration.
///
/// `backend` must match the [`TokenStoreFactory::backend_name`] of a
/// registered factory. `location` is passed through to that factory
/// unchanged; its meaning is entirely backend-specific.
///
/// | backend  | location examples                 |
/// |----------|-----------------------------------|
/// | `memory` | ignored                           |
/// | `file`   | `~/.taxcul/session.toml`          |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Lowercase identifier matching a registered factory (e.g. `"file"`).
    pub backend: String,
    /// Opaque value forwarded to the factory's `create` method.
    pub location: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            location: String::new(),
        }
    }
}

/// One implementation per storage backend, registered with a
/// [`TokenStoreRegistry`] at startup.
pub trait TokenStoreFactory: Send + Sync {
    /// Unique, lowercase identifier for this backend.
    fn backend_name(&self) -> &'static str;

    fn create(&self, config: &StoreConfig) -> Result<Arc<dyn TokenStore>, SessionError>;
}

pub struct MemoryTokenStoreFactory;

impl TokenStoreFactory for MemoryTokenStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    fn create(
        &self,
        _config: &StoreConfig,
    ) -> Result<Arc<dyn TokenStore>, SessionError> {
        Ok(Arc::new(MemoryTokenStore::new()))
    }
}

pub struct FileTokenStoreFactory;

impl TokenStoreFactory for FileTokenStoreFactory {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    /// `config.location` is the session file path; it must not be empty.
    fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Arc<dyn TokenStore>, SessionError> {
        if config.location.trim().is_empty() {
            return Err(SessionError::Configuration(
                "the file session store needs a location".to_string(),
            ));
        }
        Ok(Arc::new(FileTokenStore::new(config.location.trim())))
    }
}

/// Registry of [`TokenStoreFactory`] instances, keyed by backend name.
pub struct TokenStoreRegistry {
    factories: HashMap<&'static str, Box<dyn TokenStoreFactory>>,
}

impl TokenStoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A registry with the `memory` and `file` backends.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MemoryTokenStoreFactory));
        registry.register(Box::new(FileTokenStoreFactory));
        registry
    }

    /// Register a backend factory, replacing any factory of the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn TokenStoreFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Dispatch to the factory that matches `config.backend`.
    ///
    /// # Errors
    /// * [`SessionError::Configuration`] when no factory is registered for
    ///   the requested backend name.
    /// * Any error the chosen factory itself returns.
    pub fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Arc<dyn TokenStore>, SessionError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                SessionError::Configuration(format!(
                    "unknown session backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config)
    }
}

impl Default for TokenStoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// tests
// ─────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;

    /// A factory whose `create` flips an `AtomicBool`, so tests can prove
    /// which factory the registry dispatched to.
    struct StubFactory {
        name: &'static str,
        called: Arc<AtomicBool>,
    }

    impl TokenStoreFactory for StubFactory {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        fn create(
            &self,
            _config: &StoreConfig,
        ) -> Result<Arc<dyn TokenStore>, SessionError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(Arc::new(MemoryTokenStore::new()))
        }
    }

    fn stub_factory(name: &'static str) -> (Box<dyn TokenStoreFactory>, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (
            Box::new(StubFactory {
                name,
                called: flag.clone(),
            }),
            flag,
        )
    }

    fn config(
        backend: &str,
        location: &str,
    ) -> StoreConfig {
        StoreConfig {
            backend: backend.to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn default_config_is_memory() {
        assert_eq!(StoreConfig::default().backend, "memory");
    }

    #[test]
    fn new_registry_has_no_backends() {
        assert!(TokenStoreRegistry::new().available_backends().is_empty());
    }

    #[test]
    fn builtin_backends_are_sorted() {
        assert_eq!(
            TokenStoreRegistry::with_builtin().available_backends(),
            vec!["file", "memory"]
        );
    }

    #[test]
    fn duplicate_registration_replaces_previous() {
        let mut reg = TokenStoreRegistry::new();
        let (old, old_called) = stub_factory("memory");
        let (new, new_called) = stub_factory("memory");
        reg.register(old);
        reg.register(new);

        reg.create(&config("memory", "")).unwrap();

        assert_eq!(reg.available_backends(), vec!["memory"]);
        assert!(!old_called.load(Ordering::SeqCst));
        assert!(new_called.load(Ordering::SeqCst));
    }

    #[test]
    fn create_calls_only_matching_factory() {
        let mut reg = TokenStoreRegistry::new();
        let (keyring, keyring_called) = stub_factory("keyring");
        let (memory, memory_called) = stub_factory("memory");
        reg.register(keyring);
        reg.register(memory);

        reg.create(&config("memory", "")).unwrap();

        assert!(memory_called.load(Ordering::SeqCst));
        assert!(!keyring_called.load(Ordering::SeqCst));
    }

    #[test]
    fn unknown_backend_names_requested_and_available() {
        let reg = TokenStoreRegistry::with_builtin();

        match reg.create(&config("keyring", "x")) {
            Err(SessionError::Configuration(msg)) => {
                assert!(msg.contains("keyring"), "should name the requested backend");
                assert!(msg.contains("file"), "should list available backends");
                assert!(msg.contains("memory"), "should list available backends");
            }
            Err(other) => panic!("expected Configuration error, got {other:#?}"),
            Ok(_) => panic!("expected Configuration error, got a store"),
        }
    }

    #[test]
    fn file_backend_requires_location() {
        let reg = TokenStoreRegistry::with_builtin();

        assert!(matches!(
            reg.create(&config("file", "  ")),
            Err(SessionError::Configuration(_))
        ));
    }

    #[test]
    fn memory_backend_creates_empty_store() {
        let store = TokenStoreRegistry::with_builtin()
            .create(&config("memory", ""))
            .unwrap();

        assert_eq!(store.load().unwrap(), None);
    }
}
