//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`WanIpSource`]: Resolve the current public address
//! - [`ZoneRecords`]: List and patch the DNS records of one zone

pub mod wan_ip;
pub mod zone_records;

pub use wan_ip::WanIpSource;
pub use zone_records::{DnsRecord, RecordPatch, ZoneRecords, ZoneRecordsFactory};
