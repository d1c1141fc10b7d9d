// # Cloudflare DNS Record Actions
//
// JSON-level operations on the DNS records of one zone:
//
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`
//
// Every response is an envelope `{ success, errors, messages, result }`.
// Only `success` decides the outcome; the HTTP status is ignored.

use async_trait::async_trait;
use ddns_core::traits::{DnsRecord, RecordPatch, ZoneRecords};
use ddns_core::{Error, Result};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;

use crate::client::CloudflareApi;

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    errors: Value,
}

/// Check a response envelope and return its `result`
///
/// # Errors
///
/// - [`Error::Transport`] if `body` is not a JSON envelope
/// - [`Error::Response`] if `success` is false; the provider's `errors`
///   array is logged and carried in the message
pub fn analyze_response(body: &[u8], operation: &str) -> Result<Value> {
    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| {
        Error::transport(format!("{}: malformed response body: {}", operation, e))
    })?;

    if envelope.success {
        return Ok(envelope.result);
    }

    tracing::error!("Api request error ({}): {}", operation, envelope.errors);
    Err(Error::response(format!("{}: {}", operation, envelope.errors)))
}

/// DNS records of one Cloudflare zone
#[derive(Debug, Clone)]
pub struct CloudflareZone {
    api: CloudflareApi,
    zone_id: String,
}

impl CloudflareZone {
    pub fn new(api: CloudflareApi, zone_id: impl Into<String>) -> Self {
        Self {
            api,
            zone_id: zone_id.into(),
        }
    }

    fn records_path(&self) -> String {
        format!("zones/{}/dns_records", self.zone_id)
    }
}

#[async_trait]
impl ZoneRecords for CloudflareZone {
    /// List the zone's DNS records
    ///
    /// Only the first page is read; no pagination parameters are sent.
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let response = self
            .api
            .request(Method::GET, &self.records_path(), None)
            .await?;
        let result = analyze_response(&response.body, "list dns records")?;

        serde_json::from_value(result).map_err(|e| {
            Error::response(format!("list dns records: unexpected result: {}", e))
        })
    }

    /// Patch one record, sending only the fields present in `patch`
    async fn patch_record(&self, record_id: &str, patch: &RecordPatch) -> Result<DnsRecord> {
        let path = format!("{}/{}", self.records_path(), record_id);
        let body = Value::Object(patch.to_body());
        tracing::debug!(zone = %self.zone_id, "Patching DNS record {}: {}", record_id, body);

        let response = self.api.request(Method::PATCH, &path, Some(&body)).await?;
        let result = analyze_response(&response.body, "patch dns record")?;

        serde_json::from_value(result).map_err(|e| {
            Error::response(format!("patch dns record: unexpected result: {}", e))
        })
    }

    fn zone_id(&self) -> &str {
        &self.zone_id
    }
}
