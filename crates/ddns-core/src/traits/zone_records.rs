// # Zone Records Trait
//
// Defines the interface for reading and patching the DNS records of a single
// provider zone.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{RecordPatch, ZoneRecords};
//
// let zone = /* ZoneRecords implementation */;
// let records = zone.list_records().await?;
// let record = &records[0];
// zone.patch_record(&record.id, &RecordPatch::preserving(record, "5.6.7.8")).await?;
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::IpAddr;

use crate::config::{RecordType, ZoneConfig};

/// A DNS record as returned by the provider
///
/// Fields the updater does not look at are kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider record identifier
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record type ("A", "AAAA", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value; empty when the provider omits it
    #[serde(default)]
    pub content: String,
    /// Time-to-live in seconds (1 means "automatic" on Cloudflare)
    #[serde(default = "automatic_ttl")]
    pub ttl: u32,
    /// Whether traffic is proxied through the provider's CDN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxied: Option<bool>,
    /// Any other provider fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// TTL value asking the provider to choose
pub const AUTOMATIC_TTL: u32 = 1;

fn automatic_ttl() -> u32 {
    AUTOMATIC_TTL
}

impl DnsRecord {
    /// Whether this record is the configured target
    pub fn matches(&self, name: &str, record_type: RecordType) -> bool {
        self.name == name && self.record_type == record_type.as_str()
    }

    /// Whether the record already points at `address`
    ///
    /// Content that does not parse as an address never matches.
    pub fn holds(&self, address: IpAddr) -> bool {
        self.content
            .trim()
            .parse::<IpAddr>()
            .is_ok_and(|current| current == address)
    }
}

/// Partial update of a DNS record
///
/// Every field is optional; an absent field is left out of the request body
/// entirely so the provider leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub record_type: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
    pub ttl: Option<u32>,
    pub proxied: Option<bool>,
}

impl RecordPatch {
    /// An empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// A patch that rewrites `content` and keeps everything else of `record`
    pub fn preserving(record: &DnsRecord, content: impl Into<String>) -> Self {
        Self::new()
            .with_record_type(record.record_type.clone())
            .with_name(record.name.clone())
            .with_content(content)
            .with_ttl(record.ttl)
            .with_proxied(record.proxied)
    }

    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Set or clear the proxied flag; `None` leaves it out of the body
    pub fn with_proxied(mut self, proxied: Option<bool>) -> Self {
        self.proxied = proxied;
        self
    }

    /// Request body containing only the present fields
    pub fn to_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        if let Some(record_type) = &self.record_type {
            body.insert("type".to_string(), Value::from(record_type.as_str()));
        }
        if let Some(name) = &self.name {
            body.insert("name".to_string(), Value::from(name.as_str()));
        }
        if let Some(content) = &self.content {
            body.insert("content".to_string(), Value::from(content.as_str()));
        }
        if let Some(ttl) = self.ttl {
            body.insert("ttl".to_string(), Value::from(ttl));
        }
        if let Some(proxied) = self.proxied {
            body.insert("proxied".to_string(), Value::from(proxied));
        }
        body
    }
}

/// Trait for the record operations of one provider zone
///
/// An implementation is bound to a single zone identifier at construction.
/// It performs exactly the requested call: no retries, no caching.
#[async_trait]
pub trait ZoneRecords: Send + Sync {
    /// List the zone's DNS records in provider order
    async fn list_records(&self) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Apply `patch` to the record `record_id` and return the updated record
    async fn patch_record(
        &self,
        record_id: &str,
        patch: &RecordPatch,
    ) -> Result<DnsRecord, crate::Error>;

    /// Zone identifier this instance is bound to
    fn zone_id(&self) -> &str;
}

/// Helper trait for constructing zone clients from configuration
pub trait ZoneRecordsFactory: Send + Sync {
    /// Create a `ZoneRecords` instance for one configured zone
    fn create(&self, zone: &ZoneConfig) -> Result<Box<dyn ZoneRecords>, crate::Error>;
}
