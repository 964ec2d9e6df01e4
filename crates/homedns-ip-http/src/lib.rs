// # HTTP Echo Resolver
//
// This crate provides an HTTP-based public-IP resolver for homedns.
//
// ## Architecture
//
// Fetches an "echo" page (e.g., checkip.dyndns.org) that reports the
// requester's address somewhere in its body, and scrapes the single
// dotted-quad literal out of it. The page may be HTML; the only
// requirement is that exactly one IPv4-shaped substring appears.

use homedns_core::ProviderRegistry;
use homedns_core::config::ResolverConfig;
use homedns_core::traits::{PublicIpResolver, PublicIpResolverFactory};
use homedns_core::{Error, PublicAddress, Result};

use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Maximal run of dot-separated digit groups
static DOTTED_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:\.[0-9]+)+").expect("dotted run pattern is a valid regex")
});

/// Dotted-quad shape; octet ranges are checked when parsing
static IPV4_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}")
        .expect("IPv4 pattern is a valid regex")
});

/// HTTP echo-page resolver
pub struct HttpEchoResolver {
    /// URL of the echo page
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpEchoResolver {
    /// Create a new HTTP resolver
    ///
    /// # Parameters
    ///
    /// - `url`: Echo page to fetch (e.g., "http://checkip.dyndns.org")
    /// - `timeout`: Bound on the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Fetch the echo page body
    async fn fetch_body(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered {}",
                self.url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))
    }
}

/// Extract the single IPv4 literal from an echo page body
///
/// A candidate is a whole run of dotted digits that contains a dotted quad,
/// so `1234.5.6.7` or `1.2.3.4.5` is one malformed candidate rather than a
/// shorter valid address cut out of it.
///
/// # Returns
///
/// - `Ok(PublicAddress)`: Exactly one dotted quad was found, it parses and
///   is public
/// - `Err(Error::Resolution)`: Zero or several matches (ambiguous response),
///   an unparseable match, or a non-public address
pub fn extract_public_address(body: &str) -> Result<PublicAddress> {
    let matches: Vec<&str> = DOTTED_RUN
        .find_iter(body)
        .map(|m| m.as_str())
        .filter(|run| IPV4_PATTERN.is_match(run))
        .collect();

    let [ip] = matches.as_slice() else {
        return Err(Error::resolution(format!(
            "ambiguous response: expected one IPv4 address, found {} in {:?}",
            matches.len(),
            body
        )));
    };

    let parsed = ip
        .parse()
        .map_err(|_| Error::resolution(format!("unparseable IP {}", ip)))?;

    PublicAddress::new(parsed)
}

#[async_trait::async_trait]
impl PublicIpResolver for HttpEchoResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        tracing::debug!("Fetching public IP from {}", self.url);

        let body = self.fetch_body().await?;
        tracing::trace!("Echo response: {}", body);

        extract_public_address(&body)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}

/// Factory for creating HTTP resolvers
pub struct HttpFactory;

impl PublicIpResolverFactory for HttpFactory {
    fn create(
        &self,
        config: &ResolverConfig,
        timeout: Duration,
    ) -> Result<Box<dyn PublicIpResolver>> {
        match config {
            ResolverConfig::Http { url } => Ok(Box::new(HttpEchoResolver::new(url.clone(), timeout)?)),
            _ => Err(Error::config("Invalid config for HTTP resolver")),
        }
    }
}

/// Register the HTTP resolver with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_resolver("http", Box::new(HttpFactory));
}
