//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Selecting the zone whose next-due time is earliest
//! - Sleeping until that zone is due
//! - Running one update cycle for it (resolve WAN IP, list, maybe patch)
//! - Rescheduling it from the cycle outcome
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────────┐
//!                    │    DdnsEngine    │
//!                    │ (ZoneSchedule[]) │
//!                    └──────────────────┘
//!                             │
//!               ┌─────────────┴─────────────┐
//!               ▼                           ▼
//!       ┌──────────────┐            ┌──────────────┐
//!       │ WanIpSource  │            │ ZoneRecords  │
//!       │  (resolve)   │            │ (list/patch) │
//!       └──────────────┘            └──────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve the WAN IP for the zone's record type
//! 2. List the zone's records and find the configured name/type
//! 3. If the content differs, patch it keeping type/name/ttl/proxied
//! 4. Success waits the success interval, any failure the failure interval

mod schedule;

pub use schedule::{ZoneSchedule, most_overdue};

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::config::{DdnsConfig, RecordType, ZoneConfig};
use crate::error::{Error, Result};
use crate::traits::{RecordPatch, WanIpSource, ZoneRecords, ZoneRecordsFactory};

/// Result of one update cycle
#[derive(Debug)]
pub enum CycleOutcome {
    /// The record already held the WAN address; nothing was written
    Unchanged {
        address: IpAddr,
    },

    /// The record was patched
    Updated {
        previous: String,
        current: IpAddr,
    },

    /// The cycle was abandoned
    Failed(CycleFailure),
}

impl CycleOutcome {
    /// Whether the zone should wait its success interval
    pub fn is_success(&self) -> bool {
        !matches!(self, CycleOutcome::Failed(_))
    }
}

/// Why a cycle was abandoned
#[derive(Debug)]
pub enum CycleFailure {
    /// Resolving the WAN IP failed
    WanIp(Error),
    /// Listing the zone's records failed
    ListRecords(Error),
    /// No record matched the configured name and type
    RecordNotFound {
        name: String,
        record_type: RecordType,
    },
    /// Patching the record failed
    Patch(Error),
}

impl CycleFailure {
    /// Underlying error, if the failure came from a collaborator call
    pub fn error(&self) -> Option<&Error> {
        match self {
            CycleFailure::WanIp(e) | CycleFailure::ListRecords(e) | CycleFailure::Patch(e) => {
                Some(e)
            }
            CycleFailure::RecordNotFound { .. } => None,
        }
    }
}

impl fmt::Display for CycleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleFailure::WanIp(e) => write!(f, "failed to resolve WAN IP: {}", e),
            CycleFailure::ListRecords(e) => write!(f, "failed to list DNS records: {}", e),
            CycleFailure::RecordNotFound { name, record_type } => {
                write!(f, "no DNS record named {} with type {}", name, record_type)
            }
            CycleFailure::Patch(e) => write!(f, "failed to update DNS record: {}", e),
        }
    }
}

/// What one scheduler step did
#[derive(Debug)]
pub struct CycleReport {
    /// Zone that was serviced
    pub zone_id: String,
    /// Outcome of its cycle
    pub outcome: CycleOutcome,
    /// Interval applied after the cycle
    pub interval: Duration,
    /// New next-due time of the zone
    pub next_due: Instant,
}

/// Run one update cycle for `zone`
///
/// Never returns an error: every failure becomes a [`CycleOutcome::Failed`].
pub async fn run_cycle(
    wan_ip: &dyn WanIpSource,
    zone: &ZoneConfig,
    records: &dyn ZoneRecords,
) -> CycleOutcome {
    let address = match wan_ip.wan_ip(zone.record_type).await {
        Ok(address) => address,
        Err(e) => return CycleOutcome::Failed(CycleFailure::WanIp(e)),
    };
    debug!(zone = %zone.zone_id, "Got current WAN IP: {}", address);

    let listed = match records.list_records().await {
        Ok(listed) => listed,
        Err(e) => return CycleOutcome::Failed(CycleFailure::ListRecords(e)),
    };

    let Some(record) = listed
        .into_iter()
        .find(|record| record.matches(&zone.record_name, zone.record_type))
    else {
        return CycleOutcome::Failed(CycleFailure::RecordNotFound {
            name: zone.record_name.clone(),
            record_type: zone.record_type,
        });
    };
    debug!(zone = %zone.zone_id, "Provider DNS record: {:?}", record);

    if record.holds(address) {
        return CycleOutcome::Unchanged { address };
    }

    let patch = RecordPatch::preserving(&record, address.to_string());
    match records.patch_record(&record.id, &patch).await {
        Ok(_) => CycleOutcome::Updated {
            previous: record.content,
            current: address,
        },
        Err(e) => CycleOutcome::Failed(CycleFailure::Patch(e)),
    }
}

/// Core DDNS engine
///
/// Owns one [`ZoneSchedule`] per configured zone together with the zone's
/// record client, and services them one at a time, earliest due first.
///
/// ## Threading
///
/// Strictly sequential: the sleep and the network calls of one cycle block
/// every other zone. A zone's actual update time is therefore the later of
/// its next-due time and the end of whichever cycle is running.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`] or [`DdnsEngine::from_config()`];
///    every zone is due immediately
/// 2. Drive with [`DdnsEngine::run()`] (forever) or [`DdnsEngine::step()`]
/// 3. Drop to stop; nothing is persisted
pub struct DdnsEngine {
    /// WAN address resolver shared by all zones
    wan_ip: Box<dyn WanIpSource>,

    /// Schedule entries, index-aligned with `records`
    schedules: Vec<ZoneSchedule>,

    /// Record clients, index-aligned with `schedules`
    records: Vec<Box<dyn ZoneRecords>>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `wan_ip`: WAN address resolver
    /// - `zones`: each zone's configuration and record client
    ///
    /// # Returns
    ///
    /// An engine with every zone due now, or a configuration error when
    /// `zones` is empty
    pub fn new(
        wan_ip: Box<dyn WanIpSource>,
        zones: Vec<(ZoneConfig, Box<dyn ZoneRecords>)>,
    ) -> Result<Self> {
        if zones.is_empty() {
            return Err(Error::config("No zones configured"));
        }

        let now = Instant::now();
        let (schedules, records) = zones
            .into_iter()
            .map(|(zone, records)| (ZoneSchedule::new(zone, now), records))
            .unzip();

        Ok(Self {
            wan_ip,
            schedules,
            records,
        })
    }

    /// Create an engine from a validated configuration
    pub fn from_config(
        config: &DdnsConfig,
        wan_ip: Box<dyn WanIpSource>,
        factory: &dyn ZoneRecordsFactory,
    ) -> Result<Self> {
        config.validate()?;

        let zones = config
            .zones()
            .into_iter()
            .map(|zone| {
                let records = factory.create(&zone)?;
                Ok((zone, records))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(wan_ip, zones)
    }

    /// Current schedule entries, in configuration order
    pub fn schedules(&self) -> &[ZoneSchedule] {
        &self.schedules
    }

    /// Run the update loop forever
    ///
    /// Only returns if a step cannot select a zone, which construction
    /// rules out. Stop the loop by dropping the future.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            "Starting update loop for {} zone(s) using {}",
            self.schedules.len(),
            self.wan_ip.source_name()
        );

        loop {
            self.step().await?;
        }
    }

    /// Perform exactly one select/sleep/cycle/reschedule move
    pub async fn step(&mut self) -> Result<CycleReport> {
        let index = most_overdue(&self.schedules)
            .ok_or_else(|| Error::config("No zones configured"))?;

        let wait = self.schedules[index].time_until_due(Instant::now());
        debug!(
            zone = %self.schedules[index].zone().zone_id,
            "Sleeping for {:.3} seconds",
            wait.as_secs_f64()
        );
        tokio::time::sleep(wait).await;

        let zone = self.schedules[index].zone();
        info!(
            "Updating {}, record name {}, record type {}",
            zone.zone_id, zone.record_name, zone.record_type
        );

        let outcome = run_cycle(self.wan_ip.as_ref(), zone, self.records[index].as_ref()).await;
        log_outcome(zone, &outcome);

        let schedule = &mut self.schedules[index];
        let interval = schedule.reschedule(&outcome, Instant::now());
        let next_check = chrono::Duration::from_std(interval)
            .ok()
            .and_then(|delta| chrono::Local::now().checked_add_signed(delta));
        if let Some(next_check) = next_check {
            debug!(
                zone = %schedule.zone().zone_id,
                "Next check at {}",
                next_check.format("%Y-%m-%d %H:%M:%S")
            );
        }

        Ok(CycleReport {
            zone_id: schedule.zone().zone_id.clone(),
            outcome,
            interval,
            next_due: schedule.next_due(),
        })
    }
}

fn log_outcome(zone: &ZoneConfig, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Unchanged { address } => {
            debug!(
                zone = %zone.zone_id,
                record = %zone.record_name,
                "DNS record already points at {}",
                address
            );
        }
        CycleOutcome::Updated { previous, current } => {
            info!(
                zone = %zone.zone_id,
                record = %zone.record_name,
                "Success updating ip address from {} to {}",
                previous,
                current
            );
        }
        CycleOutcome::Failed(failure) => {
            let kind = match failure.error() {
                Some(e) if e.is_transport() => "transport",
                _ => "application",
            };
            error!(
                zone = %zone.zone_id,
                record = %zone.record_name,
                kind,
                "Update cycle failed: {}",
                failure
            );
        }
    }
}
