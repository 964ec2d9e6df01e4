//! Core sync engine
//!
//! The SyncEngine runs one public-IP to DNS record synchronization:
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ PublicIpResolver │ ──▶ │    lookup    │ ──▶ │  reconcile   │
//! │    (resolve)     │     │ (DnsProvider)│     │ (DnsProvider)│
//! └──────────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Resolve the public address
//! 2. Fetch the domain and its A records, select the record by name
//! 3. Create, update, or leave the record alone
//!
//! Each stage aborts the run on its first error. There is no retry and no
//! state between runs; re-running is always safe.

use crate::address::PublicAddress;
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, DnsRecord, Domain, PublicIpResolver};
use tracing::{debug, info};

/// TTL given to records created by the engine (in seconds)
pub const DEFAULT_RECORD_TTL: u32 = 300;

/// What a sync run did to the remote record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Record did not exist and was created
    Created {
        record_id: u64,
        target: String,
    },

    /// Record pointed elsewhere and was updated
    Updated {
        record_id: u64,
        previous: String,
        target: String,
    },

    /// Record already pointed at the public address
    Unchanged {
        target: String,
    },
}

impl SyncOutcome {
    /// Human-readable summary line for the operator
    pub fn summary(&self) -> &'static str {
        match self {
            SyncOutcome::Created { .. } => "Successfully created DNS record.",
            SyncOutcome::Updated { .. } => "Successfully updated DNS record.",
            SyncOutcome::Unchanged { .. } => "Existing DNS record is already correct.",
        }
    }

    /// Whether the run wrote to the provider
    pub fn is_write(&self) -> bool {
        !matches!(self, SyncOutcome::Unchanged { .. })
    }
}

/// Core sync engine
///
/// Owns the resolver, the provider and the immutable run configuration.
/// Every call is awaited before the next one starts.
pub struct SyncEngine {
    /// Public-IP resolver
    resolver: Box<dyn PublicIpResolver>,

    /// DNS provider
    provider: Box<dyn DnsProvider>,

    /// Run configuration
    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new sync engine
    ///
    /// # Returns
    ///
    /// - `Ok(SyncEngine)`: The configuration is valid
    /// - `Err(Error::Config)`: The configuration failed validation
    pub fn new(
        resolver: Box<dyn PublicIpResolver>,
        provider: Box<dyn DnsProvider>,
        config: SyncConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            resolver,
            provider,
            config,
        })
    }

    /// Run one full synchronization: resolve, lookup, reconcile
    pub async fn run(&self) -> Result<SyncOutcome> {
        let address = self.resolve().await?;
        debug!("Public IP: {}", address);

        let (domain, existing) = self.lookup().await?;
        debug!(
            "Pointing {}.{} to {}",
            self.config.record_name, domain.name, address
        );

        self.reconcile(&domain, existing.as_ref(), &address.to_string())
            .await
    }

    /// Discover the public address via the configured resolver
    pub async fn resolve(&self) -> Result<PublicAddress> {
        debug!("Resolving public IP via {}", self.resolver.resolver_name());

        self.resolver.resolve().await.map_err(|e| match e {
            Error::Resolution(_) => e,
            other => Error::resolution(other.to_string()),
        })
    }

    /// Fetch the domain and select the managed record, if present
    pub async fn lookup(&self) -> Result<(Domain, Option<DnsRecord>)> {
        let domain = self
            .provider
            .fetch_domain(&self.config.domain)
            .await
            .map_err(|e| Error::lookup(format!("domain {}: {}", self.config.domain, e)))?;
        debug!("Found domain {} (id {})", domain.name, domain.id);

        let records = self
            .provider
            .list_a_records(domain.id)
            .await
            .map_err(|e| Error::lookup(format!("records of {}: {}", domain.name, e)))?;
        debug!("Domain {} has {} A record(s)", domain.name, records.len());

        let existing = find_record(records, &self.config.record_name);
        Ok((domain, existing))
    }

    /// Make the remote record point at `target`
    ///
    /// Performs at most one write: create when `existing` is `None`, update
    /// when its target differs, nothing otherwise.
    pub async fn reconcile(
        &self,
        domain: &Domain,
        existing: Option<&DnsRecord>,
        target: &str,
    ) -> Result<SyncOutcome> {
        let name = &self.config.record_name;

        let Some(record) = existing else {
            let record_id = self
                .provider
                .create_a_record(domain.id, name, target, DEFAULT_RECORD_TTL)
                .await
                .map_err(|e| Error::reconcile(format!("creating {}.{}: {}", name, domain.name, e)))?;

            info!("Created {}.{} -> {} (record id {})", name, domain.name, target, record_id);
            return Ok(SyncOutcome::Created {
                record_id,
                target: target.to_string(),
            });
        };

        if record.target == target {
            debug!("Record {}.{} already points to {}", name, domain.name, target);
            return Ok(SyncOutcome::Unchanged {
                target: target.to_string(),
            });
        }

        self.provider
            .update_record_target(record, target)
            .await
            .map_err(|e| Error::reconcile(format!("updating {}.{}: {}", name, domain.name, e)))?;

        info!(
            "Updated {}.{} -> {} (was {})",
            name, domain.name, target, record.target
        );
        Ok(SyncOutcome::Updated {
            record_id: record.id,
            previous: record.target.clone(),
            target: target.to_string(),
        })
    }
}

/// Select the first record whose name equals `name` exactly
///
/// Provider order decides between duplicates.
pub fn find_record(records: Vec<DnsRecord>, name: &str) -> Option<DnsRecord> {
    records.into_iter().find(|record| record.name == name)
}
