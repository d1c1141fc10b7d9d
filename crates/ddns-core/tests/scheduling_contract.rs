//! Contract Test: Zone Selection and Sleep
//!
//! Constraints verified:
//! - Every zone is due at engine creation time
//! - The zone with the earliest next-due time is always serviced next
//! - Ties go to the first zone in configuration order
//! - The loop sleeps until the zone is due, and never when it is overdue
//!
//! All tests run on a paused tokio clock, which auto-advances while the
//! engine sleeps.

mod common;

use common::*;
use ddns_core::{CycleOutcome, DdnsEngine, Error};
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn all_zones_start_due_at_creation() {
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let start = Instant::now();

    let engine = engine_with(
        &wan_ip,
        vec![
            (zone_config("zone-a", "a.example.com"), MockZoneRecords::new("zone-a", vec![])),
            (zone_config("zone-b", "b.example.com"), MockZoneRecords::new("zone-b", vec![])),
            (zone_config("zone-c", "c.example.com"), MockZoneRecords::new("zone-c", vec![])),
        ],
    );

    assert_eq!(engine.schedules().len(), 3);
    for schedule in engine.schedules() {
        assert_eq!(schedule.next_due(), start);
    }
}

#[tokio::test(start_paused = true)]
async fn empty_zone_list_is_a_config_error() {
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let result = DdnsEngine::new(Box::new(wan_ip), Vec::new());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn ties_are_serviced_in_configuration_order() {
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let mut engine = engine_with(
        &wan_ip,
        vec![
            (zone_config("zone-a", "a.example.com"), MockZoneRecords::new("zone-a", vec![])),
            (zone_config("zone-b", "b.example.com"), MockZoneRecords::new("zone-b", vec![])),
            (zone_config("zone-c", "c.example.com"), MockZoneRecords::new("zone-c", vec![])),
        ],
    );

    let start = Instant::now();
    let mut order = Vec::new();
    for _ in 0..3 {
        order.push(engine.step().await.unwrap().zone_id);
    }

    assert_eq!(order, ["zone-a", "zone-b", "zone-c"]);
    // All three were already due, so no time passed.
    assert_eq!(Instant::now(), start);
}

#[tokio::test(start_paused = true)]
async fn earliest_due_zone_is_always_selected() {
    // Success intervals of 10 s, 3 s and 7 s leave the zones due at
    // t+10, t+3 and t+7 after their first cycle.
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let mut zones = Vec::new();
    for (zone_id, seconds) in [("zone-a", 10), ("zone-b", 3), ("zone-c", 7)] {
        let name = format!("{}.example.com", zone_id);
        let mut zone = zone_config(zone_id, &name);
        zone.success_interval = Duration::from_secs(seconds);
        let records = MockZoneRecords::new(zone_id, vec![dns_record("rec", &name, "A", "1.2.3.4")]);
        zones.push((zone, records));
    }
    let mut engine = engine_with(&wan_ip, zones);

    let start = Instant::now();
    for _ in 0..3 {
        let report = engine.step().await.unwrap();
        assert!(matches!(report.outcome, CycleOutcome::Unchanged { .. }));
    }

    let mut serviced = Vec::new();
    for _ in 0..5 {
        let report = engine.step().await.unwrap();
        serviced.push((report.zone_id, Instant::now() - start));
    }

    let secs = Duration::from_secs;
    assert_eq!(
        serviced,
        [
            ("zone-b".to_string(), secs(3)),
            ("zone-b".to_string(), secs(6)),
            ("zone-c".to_string(), secs(7)),
            ("zone-b".to_string(), secs(9)),
            ("zone-a".to_string(), secs(10)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn overdue_zone_runs_without_sleeping() {
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let records = MockZoneRecords::new(
        "zone-a",
        vec![dns_record("rec", "home.example.com", "A", "1.2.3.4")],
    );
    let mut engine = engine_with(&wan_ip, vec![(zone_config("zone-a", "home.example.com"), records)]);

    engine.step().await.unwrap();

    // Run well past the 30 s success interval before asking again.
    tokio::time::advance(Duration::from_secs(100)).await;
    let before = Instant::now();
    engine.step().await.unwrap();

    assert_eq!(Instant::now(), before, "an overdue zone must not sleep");
}

#[tokio::test(start_paused = true)]
async fn sleep_lasts_until_the_zone_is_due() {
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let records = MockZoneRecords::new(
        "zone-a",
        vec![dns_record("rec", "home.example.com", "A", "1.2.3.4")],
    );
    let mut engine = engine_with(&wan_ip, vec![(zone_config("zone-a", "home.example.com"), records)]);

    let first = engine.step().await.unwrap();
    let second = engine.step().await.unwrap();

    assert_eq!(second.next_due - first.next_due, Duration::from_secs(30));
    assert_eq!(wan_ip.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn interval_beyond_clock_range_does_not_stop_other_zones() {
    let wan_ip = ScriptedWanIp::new("1.2.3.4");
    let mut huge = zone_config("zone-a", "a.example.com");
    huge.success_interval = Duration::from_secs(u64::MAX);
    let mut engine = engine_with(
        &wan_ip,
        vec![
            (
                huge,
                MockZoneRecords::new("zone-a", vec![dns_record("rec-a", "a.example.com", "A", "1.2.3.4")]),
            ),
            (
                zone_config("zone-b", "b.example.com"),
                MockZoneRecords::new("zone-b", vec![dns_record("rec-b", "b.example.com", "A", "1.2.3.4")]),
            ),
        ],
    );

    let first = engine.step().await.unwrap();
    assert_eq!(first.zone_id, "zone-a");
    assert!(first.outcome.is_success());

    // zone-a is parked at the far end of the clock; zone-b keeps its cadence
    for _ in 0..3 {
        assert_eq!(engine.step().await.unwrap().zone_id, "zone-b");
    }
}
