// # ddns-core
//
// Core library for the per-zone DDNS scheduler.
//
// ## Architecture Overview
//
// This library keeps DNS records hosted by a provider in sync with the
// caller's public address:
// - **WanIpSource**: Trait for resolving the current WAN address
// - **ZoneRecords**: Trait for listing and patching the records of one zone
// - **ZoneSchedule**: Per-zone next-due time and interval policy
// - **DdnsEngine**: Single-threaded loop that picks the most overdue zone,
//   sleeps until it is due, runs one update cycle and reschedules it
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Scheduling is separate from the provider and
//    resolver implementations
// 2. **Sequential**: At most one update cycle is in flight at any time
// 3. **Explicit outcomes**: Every cycle ends in a `CycleOutcome`; the
//    reschedule policy is a pure function of that outcome
// 4. **Library-First**: The loop can be driven step by step from tests

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, GeneralConfig, RecordType, ZoneConfig, ZoneSettings};
pub use engine::{CycleFailure, CycleOutcome, CycleReport, DdnsEngine, ZoneSchedule, most_overdue};
pub use error::{Error, Result};
pub use traits::{DnsRecord, RecordPatch, WanIpSource, ZoneRecords, ZoneRecordsFactory};
