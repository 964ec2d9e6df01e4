// # homedns-core
//
// Core library for homedns, a one-shot dynamic DNS updater.
//
// ## Architecture Overview
//
// - **PublicIpResolver**: Trait for discovering the public IPv4 address
// - **DnsProvider**: Trait for reading and writing A records via a provider API
// - **SyncEngine**: Runs resolve → lookup → reconcile once
// - **ProviderRegistry**: Plugin-based registry for providers and resolvers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Plugin-Based**: Providers and resolvers are registered by name
// 3. **Library-First**: The binary is a thin layer over this crate
// 4. **Idempotency**: Re-running against an up-to-date record writes nothing

pub mod address;
pub mod traits;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use address::{PublicAddress, is_public_address, parse_ipv4};
pub use traits::{DnsProvider, DnsRecord, Domain, PublicIpResolver};
pub use engine::{SyncEngine, SyncOutcome};
pub use registry::ProviderRegistry;
pub use config::{ProviderConfig, ResolverConfig, SyncConfig};
pub use error::{Error, Result};
