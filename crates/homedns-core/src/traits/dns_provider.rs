// # DNS Provider Trait
//
// Defines the narrow interface the sync engine needs from a DNS
// management API.
//
// ## Implementations
//
// - Linode: `homedns-provider-linode` crate
//
// ## Usage
//
// ```rust,ignore
// use homedns_core::DnsProvider;
//
// async fn show(provider: &dyn DnsProvider) -> homedns_core::Result<()> {
//     let domain = provider.fetch_domain("example.com").await?;
//     for record in provider.list_a_records(domain.id).await? {
//         println!("{} -> {}", record.name, record.target);
//     }
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// A DNS zone managed by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// Provider-assigned identifier
    pub id: u64,
    /// Zone name (e.g., "example.com")
    pub name: String,
}

/// An A record inside a managed zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Provider-assigned record identifier
    pub id: u64,
    /// Identifier of the owning domain
    pub domain_id: u64,
    /// Record name relative to the zone (e.g., "home")
    pub name: String,
    /// Current record target
    pub target: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Trait for DNS provider implementations
///
/// Every method performs exactly one provider API call. Providers do not
/// retry, cache, or decide whether a write is needed; that is owned by
/// `SyncEngine`.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch domain metadata by exact zone name
    ///
    /// # Returns
    ///
    /// - `Ok(Domain)`: The zone with its provider identifier
    /// - `Err(Error)`: If the call failed or no zone has that name
    async fn fetch_domain(&self, domain_name: &str) -> Result<Domain, crate::Error>;

    /// List all A records of a domain, in provider order
    async fn list_a_records(&self, domain_id: u64) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create an A record
    ///
    /// # Returns
    ///
    /// The identifier of the new record
    async fn create_a_record(
        &self,
        domain_id: u64,
        name: &str,
        target: &str,
        ttl: u32,
    ) -> Result<u64, crate::Error>;

    /// Point an existing record at a new target
    ///
    /// The record's own `domain_id` and `id` identify what to update.
    async fn update_record_target(
        &self,
        record: &DnsRecord,
        target: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// `timeout` bounds every API call the provider makes.
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
        timeout: std::time::Duration,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
