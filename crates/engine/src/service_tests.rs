// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::host::HostContext;
use crate::library::{MemoryPollLibrary, PollLibrary};
use picket_bus::loopback::{LoopbackBus, Network};
use picket_bus::Bus;
use picket_core::test_support::{sim_credentials, snmp_pollaris, snmp_target};
use picket_core::{EngineConfig, FakeClock, BOOT_STAGES};
use picket_protocols::Resources;

fn node(network: &Network) -> (CollectorService<FakeClock>, LoopbackBus, FakeClock) {
    let bus = network.node();
    let clock = FakeClock::new();
    let library = MemoryPollLibrary::new().with(
        snmp_pollaris("mib2", "sysDescr", ".1.3.6.1.2.1.1.1.0", 60).with_group(BOOT_STAGES[0]),
    );
    let ctx = HostContext {
        bus: Arc::new(bus.clone()) as Arc<dyn picket_bus::Bus>,
        library: Arc::new(library) as Arc<dyn PollLibrary>,
        resources: Resources::new(Arc::new(sim_credentials()), EngineConfig::default()),
        clock: clock.clone(),
        area: 0,
    };
    (CollectorService::new(ctx), bus, clock)
}

#[tokio::test(start_paused = true)]
async fn post_creates_and_starts_host_collectors() {
    let network = Network::new();
    let (service, _bus, _clock) = node(&network);

    let target = snmp_target("10.20.30.1");
    service.post(&target);

    let key = HostKey::new("10.20.30.1", "10.20.30.1");
    let collector = service.host_collector(&key).unwrap();
    assert!(collector.is_running());
    assert_eq!(service.owned_hosts(), vec![key]);
    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn post_is_idempotent_per_host() {
    let network = Network::new();
    let (service, _bus, _clock) = node(&network);
    let target = snmp_target("10.20.30.1");

    service.post(&target);
    service.put(&target);

    assert_eq!(service.owned_hosts().len(), 1);
    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn replicated_put_does_not_claim_ownership() {
    // PUT/PATCH replicate target state to the whole fleet; a node that
    // never saw the POST must not start scheduling.
    let network = Network::new();
    let (service, _bus, _clock) = node(&network);

    service.put(&snmp_target("10.20.30.1"));

    assert!(service.owned_hosts().is_empty());
    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn delete_stops_and_removes() {
    let network = Network::new();
    let (service, _bus, _clock) = node(&network);
    let target = snmp_target("10.20.30.1");
    service.post(&target);
    let key = HostKey::new("10.20.30.1", "10.20.30.1");
    let collector = service.host_collector(&key).unwrap();

    service.delete("10.20.30.1");

    assert!(service.host_collector(&key).is_none());
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert!(!collector.is_running());
}

#[tokio::test(start_paused = true)]
async fn activate_exposes_collector_and_exec_services() {
    let network = Network::new();
    let (service, bus, _clock) = node(&network);
    let _exec = service.activate();

    assert_eq!(bus.participants(COLLECTOR_SERVICE, 0).len(), 1);
    assert_eq!(bus.participants(EXEC_SERVICE, 0).len(), 1);

    // A target posted over the bus starts its collector.
    let target = snmp_target("10.20.30.1");
    let payload = serde_json::to_vec(&target).unwrap();
    bus.multicast(COLLECTOR_SERVICE, 0, picket_bus::Verb::Post, payload).await.unwrap();

    let key = HostKey::new("10.20.30.1", "10.20.30.1");
    assert!(service.host_collector(&key).is_some());

    // Delete over the bus stops it.
    let payload = serde_json::to_vec(&target).unwrap();
    bus.multicast(COLLECTOR_SERVICE, 0, picket_bus::Verb::Delete, payload).await.unwrap();
    assert!(service.host_collector(&key).is_none());
    service.shutdown();
}

#[tokio::test(start_paused = true)]
async fn shutdown_unregisters_from_bus() {
    let network = Network::new();
    let (service, bus, _clock) = node(&network);
    let _exec = service.activate();
    service.post(&snmp_target("10.20.30.1"));

    service.shutdown();

    assert!(bus.participants(COLLECTOR_SERVICE, 0).is_empty());
    assert!(bus.participants(EXEC_SERVICE, 0).is_empty());
    assert!(service.owned_hosts().is_empty());
}
