//! Test doubles and common utilities for scheduler contract tests
//!
//! The doubles share their state through `Arc`s so a test can keep a handle
//! after boxing a clone into the engine.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsRecord, RecordPatch, WanIpSource, ZoneRecords};
use ddns_core::{RecordType, ZoneConfig};
use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A WAN IP source whose answers are scripted by the test
#[derive(Clone)]
pub struct ScriptedWanIp {
    /// Answer returned when the script is empty
    fallback: Arc<Mutex<IpAddr>>,
    /// One-shot answers consumed before the fallback
    script: Arc<Mutex<VecDeque<Result<IpAddr>>>>,
    /// Record types requested, in call order
    requested: Arc<Mutex<Vec<RecordType>>>,
}

impl ScriptedWanIp {
    pub fn new(address: &str) -> Self {
        Self {
            fallback: Arc::new(Mutex::new(ip(address))),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Change the steady-state answer
    pub fn set_address(&self, address: &str) {
        *self.fallback.lock().unwrap() = ip(address);
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: Error) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<RecordType> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl WanIpSource for ScriptedWanIp {
    async fn wan_ip(&self, record_type: RecordType) -> Result<IpAddr> {
        self.requested.lock().unwrap().push(record_type);
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        Ok(*self.fallback.lock().unwrap())
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// A zone client backed by an in-memory record list
#[derive(Clone)]
pub struct MockZoneRecords {
    zone_id: String,
    records: Arc<Mutex<Vec<DnsRecord>>>,
    list_failures: Arc<Mutex<VecDeque<Error>>>,
    patch_failures: Arc<Mutex<VecDeque<Error>>>,
    list_call_count: Arc<AtomicUsize>,
    patches: Arc<Mutex<Vec<(String, RecordPatch)>>>,
}

impl MockZoneRecords {
    pub fn new(zone_id: &str, records: Vec<DnsRecord>) -> Self {
        Self {
            zone_id: zone_id.to_string(),
            records: Arc::new(Mutex::new(records)),
            list_failures: Arc::new(Mutex::new(VecDeque::new())),
            patch_failures: Arc::new(Mutex::new(VecDeque::new())),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            patches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make the next list call fail with `error`
    pub fn fail_next_list(&self, error: Error) {
        self.list_failures.lock().unwrap().push_back(error);
    }

    /// Make the next patch call fail with `error`
    pub fn fail_next_patch(&self, error: Error) {
        self.patch_failures.lock().unwrap().push_back(error);
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Patch calls received, as (record id, patch)
    pub fn patches(&self) -> Vec<(String, RecordPatch)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn record(&self, id: &str) -> Option<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }
}

#[async_trait::async_trait]
impl ZoneRecords for MockZoneRecords {
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.list_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn patch_record(&self, record_id: &str, patch: &RecordPatch) -> Result<DnsRecord> {
        self.patches
            .lock()
            .unwrap()
            .push((record_id.to_string(), patch.clone()));
        if let Some(error) = self.patch_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id == record_id)
            .ok_or_else(|| Error::response(format!("patch dns record: no record {}", record_id)))?;
        if let Some(content) = &patch.content {
            record.content = content.clone();
        }
        Ok(record.clone())
    }

    fn zone_id(&self) -> &str {
        &self.zone_id
    }
}

pub fn ip(address: &str) -> IpAddr {
    address.parse().expect("valid test address")
}

/// A provider record with the usual Cloudflare shape
pub fn dns_record(id: &str, name: &str, record_type: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
        ttl: 1,
        proxied: Some(false),
        extra: serde_json::Map::new(),
    }
}

/// Zone configuration with a 5 s failure and 30 s success interval
pub fn zone_config(zone_id: &str, record_name: &str) -> ZoneConfig {
    ZoneConfig {
        zone_id: zone_id.to_string(),
        api_token: "test-token".to_string(),
        record_name: record_name.to_string(),
        record_type: RecordType::A,
        failure_interval: Duration::from_secs(5),
        success_interval: Duration::from_secs(30),
    }
}

/// Build an engine over the given doubles; every zone is due now
pub fn engine_with(
    wan_ip: &ScriptedWanIp,
    zones: Vec<(ZoneConfig, MockZoneRecords)>,
) -> ddns_core::DdnsEngine {
    let zones = zones
        .into_iter()
        .map(|(zone, records)| (zone, Box::new(records) as Box<dyn ZoneRecords>))
        .collect();
    ddns_core::DdnsEngine::new(Box::new(wan_ip.clone()), zones).expect("engine construction succeeds")
}
