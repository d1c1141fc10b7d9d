//! Per-zone schedule entries
//!
//! Each configured zone owns one [`ZoneSchedule`]. The scheduler always
//! services the entry with the earliest next-due time, and the outcome of a
//! cycle alone decides how far that time moves forward.

use std::time::Duration;
use tokio::time::Instant;

use super::CycleOutcome;
use crate::config::ZoneConfig;

/// Schedule entry of one zone
#[derive(Debug, Clone)]
pub struct ZoneSchedule {
    zone: ZoneConfig,
    next_due: Instant,
}

impl ZoneSchedule {
    /// Create an entry that becomes eligible at `next_due`
    pub fn new(zone: ZoneConfig, next_due: Instant) -> Self {
        Self { zone, next_due }
    }

    /// The zone's configuration
    pub fn zone(&self) -> &ZoneConfig {
        &self.zone
    }

    /// When the zone is next eligible for an update cycle
    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    /// Time left until the zone is due, zero when already overdue
    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }

    /// Move the next-due time according to `outcome`, measured from `now`
    ///
    /// Successful cycles wait the zone's success interval, every failure
    /// waits its failure interval. Returns the interval applied. An interval
    /// past the clock's range leaves the zone due at the latest
    /// representable time.
    pub fn reschedule(&mut self, outcome: &CycleOutcome, now: Instant) -> Duration {
        let interval = if outcome.is_success() {
            self.zone.success_interval
        } else {
            self.zone.failure_interval
        };
        self.next_due = now
            .checked_add(interval)
            .unwrap_or_else(|| far_future(now));
        interval
    }
}

/// Latest instant reachable from `now`, halving the step until it fits
fn far_future(now: Instant) -> Instant {
    let mut step = Duration::from_secs(u64::MAX);
    let mut latest = now;
    while !step.is_zero() {
        if let Some(later) = latest.checked_add(step) {
            latest = later;
        } else {
            step /= 2;
        }
    }
    latest
}

/// Index of the most overdue entry (earliest next-due time)
///
/// Ties go to the first entry encountered. Returns `None` for an empty slice.
pub fn most_overdue(schedules: &[ZoneSchedule]) -> Option<usize> {
    schedules
        .iter()
        .enumerate()
        .min_by_key(|(_, schedule)| schedule.next_due)
        .map(|(index, _)| index)
}
