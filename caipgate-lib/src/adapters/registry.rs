//! Adapter Factory Registry
//!
//! Adapter kinds are registered by name together with a factory that builds
//! an adapter for a node configuration. Gateway configs refer to adapters by
//! kind name, and the registry turns each configured route into an adapter
//! instance.
//!
//! # Thread Safety
//!
//! The registry uses `RwLock` for shared access. A poisoned lock is
//! recovered rather than propagated, since factories are only inserted or
//! removed whole.

use super::ChainAdapter;
use crate::config::NodeConfig;
use crate::{GatewayError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Builds an adapter for a node.
pub type AdapterFactory = Arc<dyn Fn(&NodeConfig) -> Result<Arc<dyn ChainAdapter>> + Send + Sync>;

/// Registry of adapter factories keyed by kind name.
///
/// # Example
///
/// ```ignore
/// let registry = AdapterRegistry::new();
/// registry.register("evm", |node| Ok(Arc::new(EvmAdapter::new(node.clone()))));
///
/// let adapter = registry.create("evm", &NodeConfig::default())?;
/// ```
pub struct AdapterRegistry {
    factories: RwLock<HashMap<String, AdapterFactory>>,
}

impl AdapterRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a factory under a kind name, replacing any previous one.
    pub fn register<F>(&self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&NodeConfig) -> Result<Arc<dyn ChainAdapter>> + Send + Sync + 'static,
    {
        let mut factories = self.factories.write().unwrap_or_else(|e| e.into_inner());
        factories.insert(kind.into(), Arc::new(factory));
    }

    /// Removes a factory. Returns it if it existed.
    pub fn unregister(&self, kind: &str) -> Option<AdapterFactory> {
        let mut factories = self.factories.write().unwrap_or_else(|e| e.into_inner());
        factories.remove(kind)
    }

    /// Gets a factory by kind name.
    pub fn get(&self, kind: &str) -> Option<AdapterFactory> {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        factories.get(kind).cloned()
    }

    /// Builds an adapter, failing with `UnknownAdapter` for an unregistered kind.
    pub fn create(&self, kind: &str, node: &NodeConfig) -> Result<Arc<dyn ChainAdapter>> {
        let factory = self
            .get(kind)
            .ok_or_else(|| GatewayError::UnknownAdapter(kind.to_string()))?;
        factory(node)
    }

    /// Checks if a kind is registered.
    pub fn contains(&self, kind: &str) -> bool {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        factories.contains_key(kind)
    }

    /// Returns all registered kind names, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        let mut kinds: Vec<String> = factories.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        factories.len()
    }

    /// Returns true if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AdapterRegistry {
    fn clone(&self) -> Self {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        Self {
            factories: RwLock::new(factories.clone()),
        }
    }
}

/// Process-wide registry for hosts that register adapters at startup.
pub mod global {
    use super::*;
    use std::sync::OnceLock;

    static GLOBAL_REGISTRY: OnceLock<AdapterRegistry> = OnceLock::new();

    /// Gets the global registry, initializing it if necessary.
    pub fn registry() -> &'static AdapterRegistry {
        GLOBAL_REGISTRY.get_or_init(AdapterRegistry::new)
    }

    /// Registers a factory in the global registry.
    pub fn register<F>(kind: impl Into<String>, factory: F)
    where
        F: Fn(&NodeConfig) -> Result<Arc<dyn ChainAdapter>> + Send + Sync + 'static,
    {
        registry().register(kind, factory);
    }

    /// Lists the kinds in the global registry.
    pub fn kinds() -> Vec<String> {
        registry().kinds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Named(String);

    #[async_trait]
    impl ChainAdapter for Named {
        fn name(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn test_register_and_create() {
        let registry = AdapterRegistry::new();
        assert!(registry.is_empty());

        registry.register("evm", |node: &NodeConfig| {
            Ok(Arc::new(Named(format!("evm@{}", node.base_url))) as Arc<dyn ChainAdapter>)
        });
        assert!(registry.contains("evm"));
        assert_eq!(registry.kinds(), vec!["evm".to_string()]);

        let node = NodeConfig::new("http://localhost:8545");
        let adapter = registry.create("evm", &node).unwrap();
        assert_eq!(adapter.name(), "evm@http://localhost:8545");
    }

    #[test]
    fn test_unknown_kind() {
        let registry = AdapterRegistry::new();
        let err = match registry.create("solana", &NodeConfig::default()) {
            Err(err) => err,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, GatewayError::UnknownAdapter(kind) if kind == "solana"));
    }

    #[test]
    fn test_unregister_and_clone() {
        let registry = AdapterRegistry::new();
        registry.register("a", |_: &NodeConfig| {
            Ok(Arc::new(Named("a".into())) as Arc<dyn ChainAdapter>)
        });
        let snapshot = registry.clone();
        assert!(registry.unregister("a").is_some());
        assert!(registry.is_empty());
        assert_eq!(snapshot.len(), 1);
    }
}
