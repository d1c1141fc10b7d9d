// # Cloudflare API Client
//
// HTTP-level access to Cloudflare API v4. Every request carries the bearer
// token and a JSON content type; the response is returned raw so the
// actions layer can inspect the envelope whatever the HTTP status was.

use ddns_core::{Error, Result};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Status and body of one API call, uninterpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Authenticated Cloudflare API client
///
/// Holds one token. Stateless apart from the pooled `reqwest::Client`.
///
/// # Security
///
/// The Debug implementation does NOT expose the API token.
#[derive(Clone)]
pub struct CloudflareApi {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API root, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for CloudflareApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareApi")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareApi {
    /// Create a client for the public Cloudflare API
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `api_token` is empty or the HTTP client cannot
    /// be built.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, CLOUDFLARE_API_BASE)
    }

    /// Create a client rooted at `base_url` instead of the public API
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(api_token, base_url, client)
    }

    /// Create a client over a caller-built `reqwest::Client`
    pub fn with_client(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// API root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a path relative to the API root
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one request
    ///
    /// `parameters` becomes the JSON body when present. The HTTP status is
    /// returned as-is and never turned into an error here.
    ///
    /// # API Call
    ///
    /// ```http
    /// <METHOD> /<path>
    /// Authorization: Bearer <token>
    /// Content-Type: application/json
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::Transport`] for connection failures, timeouts, and unreadable
    /// bodies.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        parameters: Option<&Value>,
    ) -> Result<RawResponse> {
        let url = self.url(path);
        tracing::debug!("Cloudflare request: {} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.api_token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(parameters) = parameters {
            request = request.json(parameters);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

        tracing::debug!("Cloudflare response: status {} ({} bytes)", status, body.len());
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
