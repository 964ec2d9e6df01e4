// # Linode DNS Provider
//
// This crate provides a Linode DNS manager provider for homedns.
//
// ## Behavior
//
// - One HTTP request per trait call, no retry, no caching
// - Every request bounded by the configured timeout
// - API key sent in the form body, never in URLs or logs
//
// ## API Reference
//
// The classic `api_action` endpoint: every call is a POST to a single URL
// with `api_key`, `api_action` and the action's parameters as form fields.
// Responses share one envelope:
//
// ```json
// { "ERRORARRAY": [], "ACTION": "domain.list", "DATA": [ ... ] }
// ```
//
// - `domain.list`: all domains of the account
// - `domain.resource.list` (`DomainID`): all records of a domain
// - `domain.resource.create` (`DomainID`, `Type`, `Name`, `Target`, `TTL_sec`)
// - `domain.resource.update` (`DomainID`, `ResourceID`, `Target`)

use async_trait::async_trait;
use homedns_core::config::ProviderConfig;
use homedns_core::traits::{DnsProvider, DnsProviderFactory, DnsRecord, Domain};
use homedns_core::{Error, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;

/// Linode API endpoint
pub const LINODE_API_ENDPOINT: &str = "https://api.linode.com/";

/// Response envelope shared by every action
///
/// `DATA` stays untyped until `ERRORARRAY` has been checked: failed calls
/// answer with an empty object where a list is expected.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "ERRORARRAY", default)]
    errors: Vec<ApiError>,
    #[serde(rename = "DATA", default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "ERRORCODE")]
    code: i64,
    #[serde(rename = "ERRORMESSAGE")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct DomainEntry {
    #[serde(rename = "DOMAINID")]
    domain_id: u64,
    #[serde(rename = "DOMAIN")]
    domain: String,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    #[serde(rename = "RESOURCEID")]
    resource_id: u64,
    #[serde(rename = "DOMAINID")]
    domain_id: u64,
    #[serde(rename = "TYPE")]
    kind: String,
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "TARGET")]
    target: String,
    #[serde(rename = "TTL_SEC", default)]
    ttl_sec: u32,
}

impl From<ResourceEntry> for DnsRecord {
    fn from(entry: ResourceEntry) -> Self {
        DnsRecord {
            id: entry.resource_id,
            domain_id: entry.domain_id,
            name: entry.name,
            target: entry.target,
            ttl: entry.ttl_sec,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResourceIdEntry {
    #[serde(rename = "ResourceID")]
    resource_id: u64,
}

/// Action parameters, sent as form fields
type Params = BTreeMap<&'static str, String>;

/// Linode DNS provider
pub struct LinodeProvider {
    /// Linode API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// API endpoint
    endpoint: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for LinodeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinodeProvider")
            .field("api_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl LinodeProvider {
    /// Create a new Linode provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Linode API key with DNS manager access
    /// - `endpoint`: API endpoint (None = the public Linode endpoint)
    /// - `timeout`: Bound on each API request
    pub fn new(
        api_key: impl Into<String>,
        endpoint: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("Linode API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            endpoint: endpoint.unwrap_or_else(|| LINODE_API_ENDPOINT.to_string()),
            client,
        })
    }

    /// Perform one API action and return its `DATA`
    async fn request<T: DeserializeOwned>(&self, action: &str, params: Params) -> Result<T> {
        tracing::debug!("Linode API call: {} {:?}", action, params);

        let mut form: Vec<(&str, &str)> =
            vec![("api_key", self.api_key.as_str()), ("api_action", action)];
        form.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::http(format!("{} request failed: {}", action, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read {} response: {}", action, e)))?;

        if !status.is_success() {
            return Err(Error::provider(
                "linode",
                format!("{} failed: {} - {}", action, status, body),
            ));
        }

        let envelope: Envelope = serde_json::from_str(&body)?;

        if !envelope.errors.is_empty() {
            let messages: Vec<String> = envelope
                .errors
                .iter()
                .map(|e| format!("{} (code {})", e.message, e.code))
                .collect();
            return Err(Error::provider("linode", messages.join("; ")));
        }

        if envelope.data.is_null() {
            return Err(Error::provider("linode", format!("{} response has no DATA", action)));
        }

        Ok(serde_json::from_value(envelope.data)?)
    }
}

#[async_trait]
impl DnsProvider for LinodeProvider {
    async fn fetch_domain(&self, domain_name: &str) -> Result<Domain> {
        let domains: Vec<DomainEntry> = self.request("domain.list", Params::new()).await?;

        domains
            .into_iter()
            .find(|d| d.domain == domain_name)
            .map(|d| Domain {
                id: d.domain_id,
                name: d.domain,
            })
            .ok_or_else(|| Error::provider("linode", format!("Domain not found: {}", domain_name)))
    }

    async fn list_a_records(&self, domain_id: u64) -> Result<Vec<DnsRecord>> {
        let params = Params::from([("DomainID", domain_id.to_string())]);
        let resources: Vec<ResourceEntry> = self.request("domain.resource.list", params).await?;

        Ok(resources
            .into_iter()
            .filter(|r| r.kind.eq_ignore_ascii_case("A"))
            .map(DnsRecord::from)
            .collect())
    }

    async fn create_a_record(
        &self,
        domain_id: u64,
        name: &str,
        target: &str,
        ttl: u32,
    ) -> Result<u64> {
        let params = Params::from([
            ("DomainID", domain_id.to_string()),
            ("Type", "A".to_string()),
            ("Name", name.to_string()),
            ("Target", target.to_string()),
            ("TTL_sec", ttl.to_string()),
        ]);

        let created: ResourceIdEntry = self.request("domain.resource.create", params).await?;
        tracing::info!("Linode created resource {} ({} -> {})", created.resource_id, name, target);
        Ok(created.resource_id)
    }

    async fn update_record_target(&self, record: &DnsRecord, target: &str) -> Result<()> {
        let params = Params::from([
            ("DomainID", record.domain_id.to_string()),
            ("ResourceID", record.id.to_string()),
            ("Target", target.to_string()),
        ]);

        let updated: ResourceIdEntry = self.request("domain.resource.update", params).await?;
        tracing::info!("Linode updated resource {} -> {}", updated.resource_id, target);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "linode"
    }
}

/// Factory for creating Linode providers
pub struct LinodeFactory;

impl DnsProviderFactory for LinodeFactory {
    fn create(&self, config: &ProviderConfig, timeout: Duration) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Linode { api_key, endpoint } => Ok(Box::new(LinodeProvider::new(
                api_key.clone(),
                endpoint.clone(),
                timeout,
            )?)),
        }
    }
}

/// Register the Linode provider with a registry
///
/// # Example
///
/// ```rust
/// use homedns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// homedns_provider_linode::register(&registry);
/// assert!(registry.has_provider("linode"));
/// ```
pub fn register(registry: &homedns_core::ProviderRegistry) {
    registry.register_provider("linode", Box::new(LinodeFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> LinodeProvider {
        LinodeProvider::new("secret_key_12345", Some(server.uri()), Duration::from_secs(5)).unwrap()
    }

    fn ok(action: &str, data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "ERRORARRAY": [],
            "ACTION": action,
            "DATA": data,
        }))
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = LinodeProvider::new("", None, Duration::from_secs(5)).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let provider = LinodeProvider::new("secret_key_12345", None, Duration::from_secs(5)).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("LinodeProvider"));
        assert!(debug_str.contains(LINODE_API_ENDPOINT));
    }

    #[test]
    fn test_factory_creation() {
        let factory = LinodeFactory;

        let provider = factory.create(&ProviderConfig::linode("key"), Duration::from_secs(5));
        assert_eq!(provider.ok().map(|p| p.provider_name()), Some("linode"));

        let provider = factory.create(&ProviderConfig::linode(""), Duration::from_secs(5));
        assert!(provider.is_err());
    }

    #[tokio::test]
    async fn test_fetch_domain_by_exact_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("api_action=domain.list"))
            .and(body_string_contains("api_key=secret_key_12345"))
            .respond_with(ok(
                "domain.list",
                json!([
                    { "DOMAINID": 10, "DOMAIN": "example.org", "TYPE": "master" },
                    { "DOMAINID": 42, "DOMAIN": "example.com", "TYPE": "master" }
                ]),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let domain = provider(&server).fetch_domain("example.com").await.unwrap();
        assert_eq!(
            domain,
            Domain {
                id: 42,
                name: "example.com".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_unknown_domain() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ok("domain.list", json!([{ "DOMAINID": 10, "DOMAIN": "example.org" }])))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_domain("example.com").await.unwrap_err();
        assert!(err.to_string().contains("Domain not found: example.com"));
    }

    #[tokio::test]
    async fn test_list_a_records_keeps_order_and_filters_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("api_action=domain.resource.list"))
            .and(body_string_contains("DomainID=42"))
            .respond_with(ok(
                "domain.resource.list",
                json!([
                    { "RESOURCEID": 3, "DOMAINID": 42, "TYPE": "A", "NAME": "home", "TARGET": "198.51.100.1", "TTL_SEC": 300 },
                    { "RESOURCEID": 4, "DOMAINID": 42, "TYPE": "MX", "NAME": "", "TARGET": "mail.example.com", "TTL_SEC": 0 },
                    { "RESOURCEID": 5, "DOMAINID": 42, "TYPE": "a", "NAME": "www", "TARGET": "198.51.100.2", "TTL_SEC": 3600 }
                ]),
            ))
            .mount(&server)
            .await;

        let records = provider(&server).list_a_records(42).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 3);
        assert_eq!(records[0].name, "home");
        assert_eq!(records[0].target, "198.51.100.1");
        assert_eq!(records[1].id, 5);
        assert_eq!(records[1].ttl, 3600);
    }

    #[tokio::test]
    async fn test_create_a_record_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("api_action=domain.resource.create"))
            .and(body_string_contains("DomainID=42"))
            .and(body_string_contains("Type=A"))
            .and(body_string_contains("Name=home"))
            .and(body_string_contains("Target=203.0.113.7"))
            .and(body_string_contains("TTL_sec=300"))
            .respond_with(ok("domain.resource.create", json!({ "ResourceID": 77 })))
            .expect(1)
            .mount(&server)
            .await;

        let id = provider(&server)
            .create_a_record(42, "home", "203.0.113.7", 300)
            .await
            .unwrap();
        assert_eq!(id, 77);
    }

    #[tokio::test]
    async fn test_update_record_target_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("api_action=domain.resource.update"))
            .and(body_string_contains("DomainID=42"))
            .and(body_string_contains("ResourceID=3"))
            .and(body_string_contains("Target=203.0.113.7"))
            .respond_with(ok("domain.resource.update", json!({ "ResourceID": 3 })))
            .expect(1)
            .mount(&server)
            .await;

        let record = DnsRecord {
            id: 3,
            domain_id: 42,
            name: "home".to_string(),
            target: "198.51.100.1".to_string(),
            ttl: 300,
        };

        provider(&server)
            .update_record_target(&record, "203.0.113.7")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_error_array_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ERRORARRAY": [{ "ERRORCODE": 4, "ERRORMESSAGE": "Authentication failed" }],
                "ACTION": "domain.list",
                "DATA": {}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).fetch_domain("example.com").await.unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("Authentication failed (code 4)"));
        assert!(!err.to_string().contains("secret_key_12345"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = provider(&server).list_a_records(42).await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).list_a_records(42).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
