// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::library::{boot_stage_pollaris, MemoryPollLibrary};
use picket_core::test_support::snmp_pollaris;
use picket_core::{EngineConfig, FakeClock, JobBuilder, Pollaris, BOOT_STAGES};

fn sequencer_fixture() -> (BootSequencer, Arc<dyn PollLibrary>, JobsQueue<FakeClock>) {
    let library = MemoryPollLibrary::new()
        .with(boot_stage_pollaris(30))
        .with(snmp_pollaris("mib2", "sysDescr", ".1.3.6.1.2.1.1.1.0", 30).with_group(BOOT_STAGES[1]));
    let queue = JobsQueue::new(FakeClock::new(), EngineConfig::default());
    (BootSequencer::new(), Arc::new(library), queue)
}

#[test]
fn stage_zero_loads_builtin_bundle() {
    let (mut boot, library, queue) = sequencer_fixture();
    boot.load_stage(&library, &queue, &DeviceClass::default(), "t", "h", "parser");

    assert_eq!(boot.stage(), Some(0));
    assert_eq!(queue.len(), 3);
    assert!(!boot.is_complete());
}

#[test]
fn stage_completes_when_all_jobs_reported() {
    let (mut boot, library, queue) = sequencer_fixture();
    boot.load_stage(&library, &queue, &DeviceClass::default(), "t", "h", "parser");

    for name in ["ipAddress", "deviceStatus", "systemMib"] {
        assert!(!boot.is_complete());
        boot.record_completion(&JobKey::new("boot-base", name));
    }
    assert!(boot.is_complete());
}

#[test]
fn advance_walks_all_stages_then_stops() {
    let (mut boot, library, queue) = sequencer_fixture();
    boot.load_stage(&library, &queue, &DeviceClass::default(), "t", "h", "parser");

    for expected in 1..BOOT_STAGES.len() {
        assert!(boot.advance());
        assert_eq!(boot.stage(), Some(expected));
    }
    assert!(!boot.advance());
    assert_eq!(boot.stage(), None);
}

#[test]
fn next_stage_loads_its_group() {
    let (mut boot, library, queue) = sequencer_fixture();
    boot.load_stage(&library, &queue, &DeviceClass::default(), "t", "h", "parser");
    assert!(boot.advance());
    boot.load_stage(&library, &queue, &DeviceClass::default(), "t", "h", "parser");

    assert!(queue.get(&JobKey::new("mib2", "sysDescr")).is_some());
    assert!(!boot.is_complete());
    boot.record_completion(&JobKey::new("mib2", "sysDescr"));
    assert!(boot.is_complete());
}

#[test]
fn empty_stage_is_immediately_complete() {
    let (mut boot, library, queue) = sequencer_fixture();
    // Stage 2 has no bundles registered.
    boot.advance();
    boot.advance();
    boot.load_stage(&library, &queue, &DeviceClass::default(), "t", "h", "parser");
    assert!(boot.is_complete());
}

#[test]
fn sys_object_id_extraction() {
    let map: std::collections::BTreeMap<String, Vec<u8>> = [(
        picket_core::poll::SYS_OBJECT_ID.to_string(),
        b".1.3.6.1.4.1.9.1.1".to_vec(),
    )]
    .into_iter()
    .collect();
    let job = JobBuilder::default()
        .name("systemMib")
        .result(serde_json::to_vec(&map).unwrap())
        .build();

    assert_eq!(sys_object_id(&job), Some(".1.3.6.1.4.1.9.1.1".to_string()));
}

#[test]
fn sys_object_id_absent_or_malformed() {
    let job = JobBuilder::default().build();
    assert_eq!(sys_object_id(&job), None);

    let job = JobBuilder::default().result(b"not json".to_vec()).build();
    assert_eq!(sys_object_id(&job), None);

    let empty: std::collections::BTreeMap<String, Vec<u8>> = Default::default();
    let job = JobBuilder::default().result(serde_json::to_vec(&empty).unwrap()).build();
    assert_eq!(sys_object_id(&job), None);
}

#[tokio::test(start_paused = true)]
async fn detail_jobs_join_after_delay() {
    let queue = Arc::new(JobsQueue::new(FakeClock::new(), EngineConfig::default()));
    let detail: Pollaris = snmp_pollaris(".1.3.6.1.4.1.9.1.1", "cpu", ".1.3.6.1.4.1.9.2.1", 60);

    schedule_detail(
        Arc::clone(&queue),
        detail,
        "t".to_string(),
        "h".to_string(),
        "parser".to_string(),
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(queue.is_empty());

    tokio::time::sleep(DETAIL_DELAY).await;
    tokio::task::yield_now().await;
    assert_eq!(queue.len(), 1);
}
