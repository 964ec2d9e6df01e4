//! Configuration types for homedns
//!
//! A [`SyncConfig`] is built once at startup and handed to the engine by
//! value. Nothing reads configuration from global state after that.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Default echo page used by the HTTP resolver
pub const DEFAULT_ECHO_URL: &str = "http://checkip.dyndns.org";

/// Well-known TXT name that answers with the querying address
pub const DEFAULT_TXT_QUERY: &str = "o-o.myaddr.l.google.com";

/// ns1.google.com, authoritative for [`DEFAULT_TXT_QUERY`]
pub const DEFAULT_TXT_NAMESERVER: IpAddr = IpAddr::V4(Ipv4Addr::new(216, 239, 32, 10));

/// Default bound on every external call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for a single sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// DNS zone name (e.g., "example.com")
    pub domain: String,

    /// A record name inside the zone (e.g., "home")
    pub record_name: String,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Public-IP resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Timeout for each external call (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SyncConfig {
    /// Create a configuration with the default resolver and timeout
    pub fn new(
        domain: impl Into<String>,
        record_name: impl Into<String>,
        provider: ProviderConfig,
    ) -> Self {
        Self {
            domain: domain.into(),
            record_name: record_name.into(),
            provider,
            resolver: ResolverConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Set the resolver strategy
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the per-call timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Per-call timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fully qualified name of the managed record
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.record_name, self.domain)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.domain)?;

        if self.record_name.is_empty() {
            return Err(crate::Error::config("Record name cannot be empty"));
        }
        if self.record_name.chars().any(char::is_whitespace) {
            return Err(crate::Error::config(format!(
                "Record name contains whitespace: '{}'",
                self.record_name
            )));
        }

        if !(1..=300).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "Timeout must be between 1 and 300 seconds. Got: {}",
                self.timeout_secs
            )));
        }

        self.provider.validate()?;
        self.resolver.validate()?;

        if let Some(url) = self.provider.cleartext_endpoint() {
            warn!("API key will be sent unencrypted to {}", url);
        }

        Ok(())
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Linode DNS manager
    Linode {
        /// Linode API key
        api_key: String,
        /// API endpoint override (defaults to the public Linode endpoint)
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl ProviderConfig {
    /// Linode provider against the public endpoint
    pub fn linode(api_key: impl Into<String>) -> Self {
        ProviderConfig::Linode {
            api_key: api_key.into(),
            endpoint: None,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Linode { api_key, endpoint } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config("Linode API key cannot be empty"));
                }
                if let Some(url) = endpoint {
                    validate_http_url(url)?;
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Linode { .. } => "linode",
        }
    }

    /// Endpoint override that would carry the API key over plain HTTP
    pub fn cleartext_endpoint(&self) -> Option<&str> {
        match self {
            ProviderConfig::Linode { endpoint, .. } => endpoint
                .as_deref()
                .filter(|url| url.starts_with("http://")),
        }
    }
}

// The API key must never reach logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Linode { endpoint, .. } => f
                .debug_struct("Linode")
                .field("api_key", &"<REDACTED>")
                .field("endpoint", endpoint)
                .finish(),
        }
    }
}

/// Public-IP resolver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// Scrape the address from an HTTP echo page
    Http {
        /// URL of the echo page
        url: String,
    },

    /// Ask a well-known nameserver for a TXT record holding our address
    DnsTxt {
        /// TXT name to query
        query_name: String,
        /// Nameserver to send the query to
        nameserver: IpAddr,
    },
}

impl ResolverConfig {
    /// HTTP resolver against the default echo page
    pub fn http() -> Self {
        ResolverConfig::Http {
            url: DEFAULT_ECHO_URL.to_string(),
        }
    }

    /// DNS TXT resolver against the default well-known name/nameserver pair
    pub fn dns_txt() -> Self {
        ResolverConfig::DnsTxt {
            query_name: DEFAULT_TXT_QUERY.to_string(),
            nameserver: DEFAULT_TXT_NAMESERVER,
        }
    }

    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Http { url } => validate_http_url(url),
            ResolverConfig::DnsTxt { query_name, .. } => {
                if query_name.is_empty() {
                    return Err(crate::Error::config("TXT query name cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the resolver type name
    pub fn type_name(&self) -> &str {
        match self {
            ResolverConfig::Http { .. } => "http",
            ResolverConfig::DnsTxt { .. } => "dns",
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::http()
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn validate_http_url(url: &str) -> Result<(), crate::Error> {
    if url.is_empty() {
        return Err(crate::Error::config("URL cannot be empty"));
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(crate::Error::config(format!(
            "URL must use HTTP or HTTPS scheme. Got: {}",
            url
        )));
    }
    Ok(())
}

/// Validate a zone name
///
/// Only rejects names that can never match: empty, or containing
/// whitespace or control characters. Everything else is left to the
/// provider's exact name match.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(crate::Error::config(format!(
            "Domain name contains whitespace: {:?}",
            domain
        )));
    }

    Ok(())
}
