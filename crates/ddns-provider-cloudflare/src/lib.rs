// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `ZoneRecords` for the
// DDNS system.
//
// ## Layers
//
// - [`CloudflareApi`]: HTTP-level client (base URL, bearer token, JSON
//   content type, 30 second timeout)
// - [`CloudflareZone`]: JSON-level list/patch of one zone's DNS records,
//   with the `success` envelope check
// - [`CloudflareFactory`]: builds one `CloudflareZone` per configured zone
//
// ## Responsibilities
//
// - One HTTP request per trait call
// - No retry, backoff or scheduling (owned by `DdnsEngine`)
// - No caching between calls
//
// ## Security Requirements
//
// - API token NEVER appears in logs
// - An empty token is rejected at construction
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

mod actions;
mod client;

pub use actions::{CloudflareZone, analyze_response};
pub use client::{CLOUDFLARE_API_BASE, CloudflareApi, DEFAULT_HTTP_TIMEOUT, RawResponse};

use ddns_core::traits::{ZoneRecords, ZoneRecordsFactory};
use ddns_core::{Result, ZoneConfig};

/// Factory for creating Cloudflare zone clients
#[derive(Debug, Clone)]
pub struct CloudflareFactory {
    base_url: String,
}

impl CloudflareFactory {
    /// Factory targeting the public Cloudflare API
    pub fn new() -> Self {
        Self::with_base_url(CLOUDFLARE_API_BASE)
    }

    /// Factory targeting another API root
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for CloudflareFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneRecordsFactory for CloudflareFactory {
    fn create(&self, zone: &ZoneConfig) -> Result<Box<dyn ZoneRecords>> {
        let api = CloudflareApi::with_base_url(zone.api_token.clone(), self.base_url.clone())?;
        tracing::debug!(zone = %zone.zone_id, "Created Cloudflare client for {}", api.base_url());
        Ok(Box::new(CloudflareZone::new(api, zone.zone_id.clone())))
    }
}
