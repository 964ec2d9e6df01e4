// # Public-IP Resolver Trait
//
// Defines the interface for discovering the machine's public IPv4 address
// from an external authority.
//
// ## Implementations
//
// - HTTP echo page: `homedns-ip-http` crate
// - DNS TXT probe: `homedns-ip-dns` crate

use crate::address::PublicAddress;
use async_trait::async_trait;

/// Trait for public-IP resolver implementations
///
/// A resolver makes exactly one outbound call per [`resolve`] and never
/// retries. Transport failures, ambiguous answers and non-public addresses
/// are all reported as `Error::Resolution`.
///
/// [`resolve`]: PublicIpResolver::resolve
#[async_trait]
pub trait PublicIpResolver: Send + Sync {
    /// Discover the current public address
    async fn resolve(&self) -> Result<PublicAddress, crate::Error>;

    /// Short name of the strategy (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}

/// Helper trait for constructing resolvers from configuration
pub trait PublicIpResolverFactory: Send + Sync {
    /// Create a resolver instance from configuration
    ///
    /// `timeout` bounds the single outbound call.
    fn create(
        &self,
        config: &crate::config::ResolverConfig,
        timeout: std::time::Duration,
    ) -> Result<Box<dyn PublicIpResolver>, crate::Error>;
}
