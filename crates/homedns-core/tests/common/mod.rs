//! Test doubles and common utilities for sync contract tests
//!
//! The mock provider records every call so tests can assert exactly which
//! writes a run performed.

#![allow(dead_code)]

use homedns_core::error::{Error, Result};
use homedns_core::traits::{DnsProvider, DnsRecord, Domain, PublicIpResolver};
use homedns_core::{ProviderConfig, PublicAddress, SyncConfig};
use std::sync::{Arc, Mutex};

/// A provider call as observed by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    FetchDomain(String),
    ListARecords(u64),
    CreateARecord {
        domain_id: u64,
        name: String,
        target: String,
        ttl: u32,
    },
    UpdateRecordTarget {
        domain_id: u64,
        record_id: u64,
        target: String,
    },
}

impl ProviderCall {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ProviderCall::CreateARecord { .. } | ProviderCall::UpdateRecordTarget { .. }
        )
    }
}

/// Which provider operation should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    FetchDomain,
    ListARecords,
    Create,
    Update,
}

/// A mock DnsProvider backed by in-memory domains and records
pub struct MockDnsProvider {
    domains: Vec<Domain>,
    records: Vec<DnsRecord>,
    fail_on: FailOn,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl MockDnsProvider {
    pub fn new(domains: Vec<Domain>, records: Vec<DnsRecord>) -> Self {
        Self {
            domains,
            records,
            fail_on: FailOn::Nothing,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make one operation return a provider error
    pub fn failing_on(mut self, fail_on: FailOn) -> Self {
        self.fail_on = fail_on;
        self
    }

    /// Shared handle to the call log, readable after the provider is moved
    pub fn calls(&self) -> Arc<Mutex<Vec<ProviderCall>>> {
        Arc::clone(&self.calls)
    }

    fn record_call(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: FailOn) -> Result<()> {
        if self.fail_on == op {
            return Err(Error::provider("mock", format!("{:?} rejected", op)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn fetch_domain(&self, domain_name: &str) -> Result<Domain> {
        self.record_call(ProviderCall::FetchDomain(domain_name.to_string()));
        self.check(FailOn::FetchDomain)?;

        self.domains
            .iter()
            .find(|d| d.name == domain_name)
            .cloned()
            .ok_or_else(|| Error::provider("mock", "Domain not found"))
    }

    async fn list_a_records(&self, domain_id: u64) -> Result<Vec<DnsRecord>> {
        self.record_call(ProviderCall::ListARecords(domain_id));
        self.check(FailOn::ListARecords)?;

        Ok(self
            .records
            .iter()
            .filter(|r| r.domain_id == domain_id)
            .cloned()
            .collect())
    }

    async fn create_a_record(
        &self,
        domain_id: u64,
        name: &str,
        target: &str,
        ttl: u32,
    ) -> Result<u64> {
        self.record_call(ProviderCall::CreateARecord {
            domain_id,
            name: name.to_string(),
            target: target.to_string(),
            ttl,
        });
        self.check(FailOn::Create)?;
        Ok(9001)
    }

    async fn update_record_target(&self, record: &DnsRecord, target: &str) -> Result<()> {
        self.record_call(ProviderCall::UpdateRecordTarget {
            domain_id: record.domain_id,
            record_id: record.id,
            target: target.to_string(),
        });
        self.check(FailOn::Update)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A resolver that "discovers" a fixed dotted-quad literal
pub struct StaticResolver {
    ip: &'static str,
}

impl StaticResolver {
    pub fn new(ip: &'static str) -> Self {
        Self { ip }
    }
}

#[async_trait::async_trait]
impl PublicIpResolver for StaticResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        self.ip.parse()
    }

    fn resolver_name(&self) -> &'static str {
        "static"
    }
}

/// A resolver whose transport always fails with a non-resolution error
pub struct UnreachableResolver;

#[async_trait::async_trait]
impl PublicIpResolver for UnreachableResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        Err(Error::http("connection refused"))
    }

    fn resolver_name(&self) -> &'static str {
        "unreachable"
    }
}

pub const DOMAIN_ID: u64 = 42;

pub fn example_domain() -> Domain {
    Domain {
        id: DOMAIN_ID,
        name: "example.com".to_string(),
    }
}

pub fn a_record(id: u64, name: &str, target: &str) -> DnsRecord {
    DnsRecord {
        id,
        domain_id: DOMAIN_ID,
        name: name.to_string(),
        target: target.to_string(),
        ttl: 300,
    }
}

/// Helper to create a minimal SyncConfig for testing
pub fn minimal_config(record_name: &str) -> SyncConfig {
    SyncConfig::new("example.com", record_name, ProviderConfig::linode("test-key"))
}
