// # NS1 Remote Gateway
//
// This crate provides the NS1 implementation of `RemoteGateway`.
//
// ## Behaviour
//
// - One HTTP request per gateway call, no retries and no caching
// - 30 second client timeout
// - The API key travels in the `X-NSONE-Key` header and never appears in
//   logs or `Debug` output
// - Any status the API answers with is returned as a `GatewayReply`. Only a
//   request that got no answer is an `Err`. A 2xx body that does not decode
//   comes back with no entity
// - Zone, domain and type are percent-encoded as single path segments
//
// ## API Reference
//
// - Zones: `GET/PUT/POST/DELETE /zones/:zone`
// - Records: `GET/PUT/POST/DELETE /zones/:zone/:domain/:type`
// - List zones: `GET /zones`
//
// PUT creates, POST updates.

use async_trait::async_trait;
use dnsm_core::config::GatewayConfig;
use dnsm_core::traits::{GatewayFactory, GatewayReply, RemoteGateway};
use dnsm_core::{Error, Record, RecordKey, Result, Zone};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// NS1 API base URL
pub const NS1_API_BASE: &str = "https://api.nsone.net/v1";

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-NSONE-Key";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const GATEWAY_NAME: &str = "ns1";

/// NS1 gateway
pub struct Ns1Gateway {
    /// NS1 API key, never logged
    api_key: String,

    /// Base URL without trailing slash
    endpoint: Url,

    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for Ns1Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ns1Gateway")
            .field("api_key", &"<REDACTED>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Ns1Gateway {
    /// Create a gateway talking to `endpoint`, or to the public API when `None`
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the key is empty or the endpoint is not a base URL
    /// - `Error::Transport` if the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>, endpoint: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("NS1 API key cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        let raw = endpoint.unwrap_or_else(|| NS1_API_BASE.to_string());
        let endpoint = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| Error::config(format!("Invalid NS1 endpoint {:?}: {}", raw, e)))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::config(format!("Invalid NS1 endpoint {:?}: not a base URL", raw)));
        }

        Ok(Self {
            api_key,
            endpoint,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    /// List every zone on the account
    ///
    /// ```http
    /// GET /zones
    /// X-NSONE-Key: <key>
    /// ```
    pub async fn list_zones(&self) -> Result<GatewayReply<Vec<Zone>>> {
        let url = self.url(&["zones"]);
        self.send(self.request(Method::GET, url)).await
    }

    /// Endpoint with `segments` appended, each escaped as one path segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // The endpoint was checked to be a base URL in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn zone_url(&self, zone: &str) -> Url {
        self.url(&["zones", zone])
    }

    fn record_url(&self, key: &RecordKey) -> Url {
        self.url(&["zones", &key.zone, &key.domain, &key.record_type])
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!("NS1 {} {}", method, url);
        self.client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key)
    }

    fn with_body<B: Serialize>(&self, method: Method, url: Url, body: &B) -> RequestBuilder {
        self.request(method, url).json(body)
    }

    /// Send a request and decode a successful body into `T`
    ///
    /// The provider answered even when the body does not decode, so that
    /// case is a reply without an entity rather than an error.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<GatewayReply<T>> {
        let (status, body) = self.exchange(request).await?;

        if !status.is_success() {
            return Ok(GatewayReply::bare(status, body));
        }

        if body.trim().is_empty() {
            return Ok(GatewayReply::bare(status, body));
        }

        match serde_json::from_str(&body) {
            Ok(entity) => Ok(GatewayReply {
                status,
                entity: Some(entity),
                body,
            }),
            Err(e) => {
                tracing::warn!(%status, error = %e, "Failed to parse NS1 response");
                Ok(GatewayReply::bare(status, body))
            }
        }
    }

    /// Send a request whose successful body carries nothing of interest
    async fn send_bare(&self, request: RequestBuilder) -> Result<GatewayReply<()>> {
        let (status, body) = self.exchange(request).await?;
        Ok(GatewayReply::bare(status, body))
    }

    async fn exchange(&self, request: RequestBuilder) -> Result<(reqwest::StatusCode, String)> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("NS1 request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read NS1 response: {}", e)))?;

        if status.is_success() {
            tracing::debug!(%status, "NS1 request succeeded");
        } else {
            tracing::warn!(%status, "NS1 request rejected");
        }

        Ok((status, body))
    }
}

#[async_trait]
impl RemoteGateway for Ns1Gateway {
    async fn get_zone(&self, name: &str) -> Result<GatewayReply<Zone>> {
        self.send(self.request(Method::GET, self.zone_url(name)))
            .await
    }

    async fn create_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>> {
        self.send(self.with_body(Method::PUT, self.zone_url(zone.name()), zone))
            .await
    }

    async fn update_zone(&self, zone: &Zone) -> Result<GatewayReply<Zone>> {
        self.send(self.with_body(Method::POST, self.zone_url(zone.name()), zone))
            .await
    }

    async fn delete_zone(&self, name: &str) -> Result<GatewayReply<()>> {
        self.send_bare(self.request(Method::DELETE, self.zone_url(name)))
            .await
    }

    async fn get_record(&self, key: &RecordKey) -> Result<GatewayReply<Record>> {
        self.send(self.request(Method::GET, self.record_url(key)))
            .await
    }

    async fn create_record(&self, record: &Record) -> Result<GatewayReply<Record>> {
        let url = self.record_url(&record.key());
        self.send(self.with_body(Method::PUT, url, record)).await
    }

    async fn update_record(&self, record: &Record) -> Result<GatewayReply<Record>> {
        let url = self.record_url(&record.key());
        self.send(self.with_body(Method::POST, url, record)).await
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<GatewayReply<()>> {
        self.send_bare(self.request(Method::DELETE, self.record_url(key)))
            .await
    }

    fn gateway_name(&self) -> &'static str {
        GATEWAY_NAME
    }
}

/// Factory for creating NS1 gateways
pub struct Ns1Factory;

impl GatewayFactory for Ns1Factory {
    fn create(&self, config: &GatewayConfig) -> Result<Box<dyn RemoteGateway>> {
        match config {
            GatewayConfig::Ns1 { api_key, endpoint } => {
                if api_key.is_empty() {
                    return Err(Error::config("NS1 API key is required"));
                }

                if let Some(url) = endpoint {
                    tracing::info!("Using NS1 endpoint override: {}", url);
                }

                Ok(Box::new(Ns1Gateway::new(api_key.clone(), endpoint.clone())?))
            }
            _ => Err(Error::config("Invalid config for NS1 gateway")),
        }
    }
}

/// Register the NS1 gateway with a registry
///
/// # Example
///
/// ```rust
/// use dnsm_core::GatewayRegistry;
///
/// let registry = GatewayRegistry::new();
/// dnsm_provider_ns1::register(&registry);
/// assert!(registry.has_gateway("ns1"));
/// ```
pub fn register(registry: &dnsm_core::GatewayRegistry) {
    registry.register_gateway(GATEWAY_NAME, Box::new(Ns1Factory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> GatewayConfig {
        GatewayConfig::Ns1 {
            api_key: api_key.to_string(),
            endpoint: None,
        }
    }

    #[test]
    fn test_factory_creation() {
        let gateway = Ns1Factory.create(&config("test_key")).unwrap();
        assert_eq!(gateway.gateway_name(), "ns1");
    }

    #[test]
    fn test_factory_missing_key() {
        assert!(Ns1Factory.create(&config("")).is_err());
    }

    #[test]
    fn test_factory_rejects_foreign_config() {
        let foreign = GatewayConfig::Custom {
            factory: "ns1".to_string(),
            config: serde_json::json!({}),
        };
        assert!(Ns1Factory.create(&foreign).is_err());
    }

    #[test]
    fn test_empty_key_is_an_error() {
        let err = Ns1Gateway::new("", None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_default_and_override() {
        let public = Ns1Gateway::new("key", None).unwrap();
        assert_eq!(public.endpoint(), "https://api.nsone.net/v1");

        let local = Ns1Gateway::new("key", Some("http://127.0.0.1:8080/v1/".to_string())).unwrap();
        assert_eq!(local.endpoint(), "http://127.0.0.1:8080/v1");
    }

    #[test]
    fn test_urls() {
        let gateway = Ns1Gateway::new("key", None).unwrap();
        assert_eq!(
            gateway.zone_url("example.com").as_str(),
            "https://api.nsone.net/v1/zones/example.com"
        );
        assert_eq!(
            gateway
                .record_url(&RecordKey::new("example.com", "www.example.com", "A"))
                .as_str(),
            "https://api.nsone.net/v1/zones/example.com/www.example.com/A"
        );
    }

    #[test]
    fn test_url_segments_are_escaped() {
        let gateway = Ns1Gateway::new("key", None).unwrap();
        assert_eq!(
            gateway.zone_url("example.com/www.example.com/A").as_str(),
            "https://api.nsone.net/v1/zones/example.com%2Fwww.example.com%2FA"
        );
        assert_eq!(
            gateway.zone_url("other.com?x=1#top").as_str(),
            "https://api.nsone.net/v1/zones/other.com%3Fx=1%23top"
        );
    }

    #[test]
    fn test_endpoint_without_path() {
        let gateway = Ns1Gateway::new("key", Some("http://127.0.0.1:8080".to_string())).unwrap();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:8080");
        assert_eq!(
            gateway.zone_url("example.com").as_str(),
            "http://127.0.0.1:8080/zones/example.com"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_a_config_error() {
        let err = Ns1Gateway::new("key", Some("not a url".to_string())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let gateway = Ns1Gateway::new("secret_key_12345", None).unwrap();

        let debug_str = format!("{:?}", gateway);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("Ns1Gateway"));
    }

    #[test]
    fn test_register() {
        let registry = dnsm_core::GatewayRegistry::new();
        register(&registry);
        assert!(registry.create_gateway(&config("key")).is_ok());
    }
}
