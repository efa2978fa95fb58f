// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet manager: maps targets to host collectors and exposes the
//! collector service on the bus.

use crate::exec::ExecService;
use crate::host::{build_collectors, CollectorSet, HostCollector, HostContext};
use async_trait::async_trait;
use parking_lot::Mutex;
use picket_bus::{BusError, Handler, Verb};
use picket_core::{Clock, Host, HostKey, Target};
use std::collections::HashMap;
use std::sync::Arc;

/// Bus service name targets arrive on.
pub const COLLECTOR_SERVICE: &str = "collector";
/// Bus service name for on-demand execution.
pub const EXEC_SERVICE: &str = "exec";

pub(crate) struct Fleet<C: Clock> {
    pub(crate) ctx: HostContext<C>,
    pub(crate) collectors: Mutex<HashMap<HostKey, HostCollector<C>>>,
}

/// The collector service of one cluster node.
#[derive(Clone)]
pub struct CollectorService<C: Clock> {
    fleet: Arc<Fleet<C>>,
}

impl<C: Clock> CollectorService<C> {
    pub fn new(ctx: HostContext<C>) -> Self {
        Self { fleet: Arc::new(Fleet { ctx, collectors: Mutex::new(HashMap::new()) }) }
    }

    /// Install the bus handlers for this node: `collector` for target
    /// lifecycle and `exec` for on-demand execution at the same area.
    pub fn activate(&self) -> ExecService<C> {
        let area = self.fleet.ctx.area;
        let bus = Arc::clone(&self.fleet.ctx.bus);
        bus.register(
            COLLECTOR_SERVICE,
            area,
            Arc::new(CollectorHandler { fleet: Arc::clone(&self.fleet) }),
        );
        let exec = ExecService::new(Arc::clone(&self.fleet));
        exec.activate();
        exec
    }

    /// Create-or-fetch the host collectors for a target and start polling.
    pub fn post(&self, target: &Target) {
        for host in target.hosts.values() {
            let key = HostKey::new(target.target_id.clone(), host.host_id.clone());
            if self.fleet.collectors.lock().contains_key(&key) {
                continue;
            }
            let set = build_collectors(host, &self.fleet.ctx.resources);
            self.install_host_collector(target, host, set);
        }
    }

    /// Start a host collector over a caller-supplied collector set.
    ///
    /// `post` uses the default protocol implementations; sims and tests
    /// inject their own here.
    pub fn install_host_collector(&self, target: &Target, host: &Host, set: CollectorSet) {
        let key = HostKey::new(target.target_id.clone(), host.host_id.clone());
        let mut collectors = self.fleet.collectors.lock();
        if collectors.contains_key(&key) {
            return;
        }
        tracing::info!(target_id = %target.target_id, host = %host.host_id, "starting host collector");
        let collector = HostCollector::start(self.fleet.ctx.clone(), target, host, set);
        collectors.insert(key, collector);
    }

    /// Update sink for multicast replication. Only the primary refreshes
    /// (new hosts of an owned target start polling); every other node
    /// ignores the update so a target never gains a second scheduler.
    pub fn put(&self, target: &Target) {
        let owned = self
            .fleet
            .collectors
            .lock()
            .keys()
            .any(|k| k.target_id == target.target_id);
        if owned {
            self.post(target);
        }
    }

    /// Stop and drop every host collector of a target.
    pub fn delete(&self, target_id: &str) {
        let mut collectors = self.fleet.collectors.lock();
        let keys: Vec<HostKey> =
            collectors.keys().filter(|k| k.target_id == target_id).cloned().collect();
        for key in keys {
            if let Some(collector) = collectors.remove(&key) {
                tracing::info!(target_id = %key.target_id, host = %key.host_id, "stopping host collector");
                collector.stop();
            }
        }
    }

    /// The running host collector for a key, if this node owns it.
    pub fn host_collector(&self, key: &HostKey) -> Option<HostCollector<C>> {
        self.fleet.collectors.lock().get(key).cloned()
    }

    pub fn owned_hosts(&self) -> Vec<HostKey> {
        self.fleet.collectors.lock().keys().cloned().collect()
    }

    /// Stop the whole node (process shutdown).
    pub fn shutdown(&self) {
        let mut collectors = self.fleet.collectors.lock();
        for (_, collector) in collectors.drain() {
            collector.stop();
        }
        self.fleet.ctx.bus.unregister(COLLECTOR_SERVICE, self.fleet.ctx.area);
        self.fleet.ctx.bus.unregister(EXEC_SERVICE, self.fleet.ctx.area);
    }
}

struct CollectorHandler<C: Clock> {
    fleet: Arc<Fleet<C>>,
}

#[async_trait]
impl<C: Clock> Handler for CollectorHandler<C> {
    async fn handle(&self, verb: Verb, payload: &[u8]) -> Result<Vec<u8>, BusError> {
        let target: Target = decode(payload)?;
        let service = CollectorService { fleet: Arc::clone(&self.fleet) };
        match verb {
            Verb::Post => service.post(&target),
            Verb::Put | Verb::Patch => service.put(&target),
            Verb::Delete => service.delete(&target.target_id),
            Verb::Get => {}
        }
        Ok(Vec::new())
    }
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(payload: &[u8]) -> Result<T, BusError> {
    serde_json::from_slice(payload).map_err(|e| BusError::Codec(e.to_string()))
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, BusError> {
    serde_json::to_vec(value).map_err(|e| BusError::Codec(e.to_string()))
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
