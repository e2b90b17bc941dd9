//! Client side of the HTTP façade, used by the `zone` and `record` commands

use anyhow::{Context, bail};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Same budget the server gives a single NS1 call, plus slack for the store
const REQUEST_TIMEOUT: Duration = Duration::from_secs(35);

const STORE_ERROR_HEADER: &str = dnsm_http::STORE_ERROR_HEADER;

pub struct ManagerClient {
    base: String,
    http: reqwest::Client,
}

impl ManagerClient {
    /// `address` is `host:port`, or a full `http(s)://` URL
    pub fn new(address: &str) -> Result<Self, dnsm_core::Error> {
        if address.trim().is_empty() {
            return Err(dnsm_core::Error::invalid_input("Server address cannot be empty"));
        }

        let base = if address.starts_with("http://") || address.starts_with("https://") {
            address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", address.trim_end_matches('/'))
        };

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| dnsm_core::Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base, http })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Send one request and decode the reply body, if any
    ///
    /// A non-success status is an error carrying the status and the body
    /// the server answered with.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> anyhow::Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, &url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Could not reach dns-manager server at {}", self.base))?;

        let status = response.status();
        if let Some(diagnostic) = response.headers().get(STORE_ERROR_HEADER) {
            eprintln!(
                "Warning: the change reached NS1 but the server could not record it: {}",
                diagnostic.to_str().unwrap_or("<unreadable>")
            );
        }

        let text = response
            .text()
            .await
            .context("Failed to read server response")?;

        if !status.is_success() {
            bail!("{}: {}", status, text.trim());
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        let decoded = serde_json::from_str(&text)
            .with_context(|| format!("Unexpected response from server: {}", text.trim()))?;
        Ok(Some(decoded))
    }
}
