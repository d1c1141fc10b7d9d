//! Configuration types for the DDNS system
//!
//! The daemon reads a TOML file of this shape:
//!
//! ```toml
//! [general]
//! debug = false
//! log_file = "/var/log/ddns.log"   # optional, standard output when absent
//!
//! [zones.023e105f4ecef8ad9ca31a8372d0c353]
//! api_token = "..."
//! record_name = "home.example.com"
//! record_type = "A"
//! seconds_to_sleep_when_fail = 5
//! seconds_to_sleep_when_success = 30
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Zone identifier written into a freshly generated template.
pub const PLACEHOLDER_ZONE_ID: &str = "zone_identifier_here";

/// Longest accepted sleep interval (one year)
pub const MAX_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration written when no file exists yet.
pub const CONFIG_TEMPLATE: &str = r#"[general]
debug = false

[zones.zone_identifier_here]
api_token = ""
record_name = ""
record_type = "A"
seconds_to_sleep_when_fail = 5
seconds_to_sleep_when_success = 30
"#;

/// Main DDNS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Process-wide options
    #[serde(default)]
    pub general: GeneralConfig,

    /// Per-zone settings keyed by the provider's zone identifier
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneSettings>,
}

impl DdnsConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, crate::Error> {
        toml::from_str(text).map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zones.is_empty() {
            return Err(crate::Error::config("No zones configured"));
        }

        for (zone_id, settings) in &self.zones {
            if zone_id.is_empty() || zone_id == PLACEHOLDER_ZONE_ID {
                return Err(crate::Error::config(format!(
                    "Zone identifier '{}' is a placeholder, replace it with the provider's zone id",
                    zone_id
                )));
            }
            settings.validate(zone_id)?;
        }

        Ok(())
    }

    /// Resolved per-zone configuration, ordered by zone identifier
    pub fn zones(&self) -> Vec<ZoneConfig> {
        self.zones
            .iter()
            .map(|(zone_id, settings)| ZoneConfig {
                zone_id: zone_id.clone(),
                api_token: settings.api_token.clone(),
                record_name: settings.record_name.clone(),
                record_type: settings.record_type,
                failure_interval: Duration::from_secs(settings.seconds_to_sleep_when_fail),
                success_interval: Duration::from_secs(settings.seconds_to_sleep_when_success),
            })
            .collect()
    }
}

/// Options from the `[general]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable debug-level logging
    #[serde(default)]
    pub debug: bool,

    /// Append log lines to this file instead of standard output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

/// One `[zones.<id>]` table as written on disk
#[derive(Clone, Serialize, Deserialize)]
pub struct ZoneSettings {
    /// Provider API token scoped to this zone
    pub api_token: String,

    /// Full name of the record to keep in sync (e.g. "home.example.com")
    pub record_name: String,

    /// Record type, which also selects the WAN address family
    #[serde(default)]
    pub record_type: RecordType,

    /// Seconds to wait before retrying after a failed cycle
    pub seconds_to_sleep_when_fail: u64,

    /// Seconds to wait after a successful cycle
    pub seconds_to_sleep_when_success: u64,
}

impl ZoneSettings {
    fn validate(&self, zone_id: &str) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config(format!(
                "Zone {}: api_token cannot be empty",
                zone_id
            )));
        }
        if self.record_name.is_empty() {
            return Err(crate::Error::config(format!(
                "Zone {}: record_name cannot be empty",
                zone_id
            )));
        }
        if self.seconds_to_sleep_when_fail == 0 || self.seconds_to_sleep_when_success == 0 {
            return Err(crate::Error::config(format!(
                "Zone {}: sleep intervals must be > 0",
                zone_id
            )));
        }
        if self.seconds_to_sleep_when_fail > MAX_INTERVAL_SECS
            || self.seconds_to_sleep_when_success > MAX_INTERVAL_SECS
        {
            return Err(crate::Error::config(format!(
                "Zone {}: sleep intervals must be at most {} seconds",
                zone_id, MAX_INTERVAL_SECS
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ZoneSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneSettings")
            .field("api_token", &"<REDACTED>")
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("seconds_to_sleep_when_fail", &self.seconds_to_sleep_when_fail)
            .field("seconds_to_sleep_when_success", &self.seconds_to_sleep_when_success)
            .finish()
    }
}

/// DNS record type managed by the updater
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    /// A record (IPv4)
    #[default]
    #[serde(alias = "a")]
    A,
    /// AAAA record (IPv6)
    #[serde(rename = "AAAA", alias = "aaaa")]
    Aaaa,
}

impl RecordType {
    /// Record type as the provider spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved configuration of one zone, as the scheduler consumes it
#[derive(Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Opaque provider-assigned zone identifier
    pub zone_id: String,
    /// API token (never logged)
    pub api_token: String,
    /// Record name to match
    pub record_name: String,
    /// Record type to match
    pub record_type: RecordType,
    /// Delay after a failed cycle
    pub failure_interval: Duration,
    /// Delay after a successful cycle
    pub success_interval: Duration,
}

impl fmt::Debug for ZoneConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneConfig")
            .field("zone_id", &self.zone_id)
            .field("api_token", &"<REDACTED>")
            .field("record_name", &self.record_name)
            .field("record_type", &self.record_type)
            .field("failure_interval", &self.failure_interval)
            .field("success_interval", &self.success_interval)
            .finish()
    }
}
