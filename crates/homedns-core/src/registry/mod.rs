//! Plugin-based registry
//!
//! The registry maps type names to factories, so the binary can pick a DNS
//! provider and a public-IP resolver from configuration without hardcoded
//! if-else chains.
//!
//! ## Registration
//!
//! Implementations register themselves during initialization:
//!
//! ```rust,ignore
//! // In homedns-provider-linode
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("linode", Box::new(LinodeFactory));
//! }
//! ```

use crate::config::{ProviderConfig, ResolverConfig};
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsProviderFactory, PublicIpResolver, PublicIpResolverFactory};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

/// Registry for plugin-based provider and resolver creation
///
/// Uses interior mutability with RwLock, allowing registration through a
/// shared reference.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,

    /// Registered public-IP resolver factories
    resolvers: RwLock<HashMap<String, Box<dyn PublicIpResolverFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "linode")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Register a public-IP resolver factory
    ///
    /// # Parameters
    ///
    /// - `name`: Resolver type name (e.g., "http", "dns")
    /// - `factory`: Factory object for creating resolver instances
    pub fn register_resolver(
        &self,
        name: impl Into<String>,
        factory: Box<dyn PublicIpResolverFactory>,
    ) {
        self.resolvers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(
        &self,
        config: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config, timeout)
    }

    /// Create a public-IP resolver from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn PublicIpResolver>)`: Created resolver instance
    /// - `Err(Error)`: If resolver type is not registered or creation fails
    pub fn create_resolver(
        &self,
        config: &ResolverConfig,
        timeout: Duration,
    ) -> Result<Box<dyn PublicIpResolver>> {
        let resolver_type = config.type_name();
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);

        let factory = resolvers
            .get(resolver_type)
            .ok_or_else(|| Error::config(format!("Unknown resolver type: {}", resolver_type)))?;

        factory.create(config, timeout)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.keys().cloned().collect()
    }

    /// List all registered resolver types
    pub fn list_resolvers(&self) -> Vec<String> {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        providers.contains_key(name)
    }

    /// Check if a resolver type is registered
    pub fn has_resolver(&self, name: &str) -> bool {
        let resolvers = self.resolvers.read().unwrap_or_else(PoisonError::into_inner);
        resolvers.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProviderFactory;

    impl DnsProviderFactory for MockProviderFactory {
        fn create(&self, _config: &ProviderConfig, _timeout: Duration) -> Result<Box<dyn DnsProvider>> {
            Err(Error::provider("mock", "Mock provider not implemented"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();

        assert!(!registry.has_provider("linode"));

        registry.register_provider("linode", Box::new(MockProviderFactory));

        assert!(registry.has_provider("linode"));
        assert!(registry.list_providers().contains(&"linode".to_string()));
    }

    #[test]
    fn test_unknown_types_are_config_errors() {
        let registry = ProviderRegistry::new();
        let timeout = Duration::from_secs(5);

        let err = registry
            .create_provider(&ProviderConfig::linode("k"), timeout)
            .err()
            .unwrap();
        assert!(err.is_config());
        assert!(err.to_string().contains("Unknown provider type: linode"));

        let err = registry
            .create_resolver(&ResolverConfig::dns_txt(), timeout)
            .err()
            .unwrap();
        assert!(err.is_config());
        assert!(!registry.has_resolver("dns"));
        assert!(registry.list_resolvers().is_empty());
    }

    #[test]
    fn test_factory_errors_propagate() {
        let registry = ProviderRegistry::new();
        registry.register_provider("linode", Box::new(MockProviderFactory));

        let result = registry.create_provider(&ProviderConfig::linode("k"), Duration::from_secs(5));
        assert!(matches!(result, Err(Error::Provider { .. })));
    }
}
