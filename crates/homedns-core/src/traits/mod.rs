//! Core traits for homedns
//!
//! - [`PublicIpResolver`]: Discover the public IPv4 address
//! - [`DnsProvider`]: Read and write A records via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{PublicIpResolver, PublicIpResolverFactory};
pub use dns_provider::{DnsProvider, DnsProviderFactory, DnsRecord, Domain};
