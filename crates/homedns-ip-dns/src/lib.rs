// # DNS TXT Resolver
//
// This crate provides a DNS-based public-IP resolver for homedns.
//
// ## Architecture
//
// Sends a single TXT query for a well-known name straight to the
// nameserver that is authoritative for it, bypassing the system resolver:
//
// ```text
// dig +short TXT o-o.myaddr.l.google.com @216.239.32.10
// "203.0.113.7"
// ```
//
// The authoritative server answers with the source address of the query,
// which is the public address of this host.

use homedns_core::ProviderRegistry;
use homedns_core::config::ResolverConfig;
use homedns_core::traits::{PublicIpResolver, PublicIpResolverFactory};
use homedns_core::{Error, PublicAddress, Result};

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig as LookupConfig, ResolverOpts};
use hickory_resolver::proto::rr::rdata::TXT;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Port the well-known nameserver listens on
const DNS_PORT: u16 = 53;

/// DNS TXT probe resolver
#[derive(Debug, Clone)]
pub struct DnsTxtResolver {
    /// TXT name to query
    query_name: String,

    /// Nameserver the query is sent to
    nameserver: IpAddr,

    /// Port the nameserver listens on
    port: u16,

    /// Bound on the query
    timeout: Duration,
}

impl DnsTxtResolver {
    /// Create a new TXT resolver
    ///
    /// # Parameters
    ///
    /// - `query_name`: TXT name whose answer is the caller's address
    /// - `nameserver`: Nameserver to ask directly
    /// - `timeout`: Bound on the query
    pub fn new(query_name: impl Into<String>, nameserver: IpAddr, timeout: Duration) -> Self {
        Self {
            query_name: query_name.into(),
            nameserver,
            port: DNS_PORT,
            timeout,
        }
    }

    /// Send the query to a non-standard port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn lookup_resolver(&self) -> TokioAsyncResolver {
        let nameservers = NameServerConfigGroup::from_ips_clear(&[self.nameserver], self.port, true);
        let config = LookupConfig::from_parts(None, vec![], nameservers);

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;
        opts.cache_size = 0;

        TokioAsyncResolver::tokio(config, opts)
    }

    /// Query the nameserver and return the first TXT answer as text
    async fn fetch_txt(&self) -> Result<String> {
        let resolver = self.lookup_resolver();

        let response = resolver.txt_lookup(self.query_name.as_str()).await.map_err(|e| {
            Error::resolution(format!(
                "TXT lookup of {} via {} failed: {}",
                self.query_name, self.nameserver, e
            ))
        })?;

        first_txt_text(response.iter())
            .ok_or_else(|| Error::resolution(format!("empty TXT answer for {}", self.query_name)))
    }
}

/// Concatenate the character-strings of the first TXT record
fn first_txt_text<'a>(records: impl IntoIterator<Item = &'a TXT>) -> Option<String> {
    records.into_iter().next().map(|txt| {
        txt.iter()
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .collect()
    })
}

/// Turn a TXT answer into a public address
///
/// Surrounding quote characters and whitespace are stripped before the
/// remainder is parsed as IPv4.
pub fn parse_txt_answer(answer: &str) -> Result<PublicAddress> {
    let trimmed = answer.trim_matches(|c: char| c == '"' || c.is_whitespace());

    let ip: Ipv4Addr = trimmed
        .parse()
        .map_err(|_| Error::resolution(format!("invalid IP {:?} in TXT answer", trimmed)))?;

    PublicAddress::new(ip)
}

#[async_trait::async_trait]
impl PublicIpResolver for DnsTxtResolver {
    async fn resolve(&self) -> Result<PublicAddress> {
        tracing::debug!(
            "Querying TXT {} at {}",
            self.query_name,
            self.nameserver
        );

        let answer = self.fetch_txt().await?;
        tracing::trace!("TXT answer: {:?}", answer);

        parse_txt_answer(&answer)
    }

    fn resolver_name(&self) -> &'static str {
        "dns"
    }
}

/// Factory for creating DNS TXT resolvers
pub struct DnsTxtFactory;

impl PublicIpResolverFactory for DnsTxtFactory {
    fn create(
        &self,
        config: &ResolverConfig,
        timeout: Duration,
    ) -> Result<Box<dyn PublicIpResolver>> {
        match config {
            ResolverConfig::DnsTxt {
                query_name,
                nameserver,
            } => Ok(Box::new(DnsTxtResolver::new(
                query_name.clone(),
                *nameserver,
                timeout,
            ))),
            _ => Err(Error::config("Invalid config for DNS TXT resolver")),
        }
    }
}

/// Register the DNS TXT resolver with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_resolver("dns", Box::new(DnsTxtFactory));
}
