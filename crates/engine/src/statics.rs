// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in jobs the host collector executes itself.

use picket_core::poll::{JOB_DEVICE_STATUS, JOB_IP_ADDRESS};
use picket_core::{Job, Protocol, Target};
use picket_protocols::ProtocolCollector;
use std::collections::{BTreeMap, HashMap};

/// True for job names handled without a protocol collector.
pub fn is_static_job(name: &str) -> bool {
    name == JOB_IP_ADDRESS || name == JOB_DEVICE_STATUS
}

/// Execute a static job against the host's local state.
pub fn run_static_job(
    job: &mut Job,
    target: &Target,
    collectors: &HashMap<Protocol, Box<dyn ProtocolCollector>>,
) {
    match job.name.as_str() {
        JOB_IP_ADDRESS => ip_address(job, target),
        JOB_DEVICE_STATUS => device_status(job, target, collectors),
        other => job.fail(format!("unknown static job '{other}'")),
    }
}

/// Encode the first configured address across the target's hosts.
fn ip_address(job: &mut Job, target: &Target) {
    let addr = target.first_addr().unwrap_or_default();
    match serde_json::to_vec(addr) {
        Ok(bytes) => job.succeed(bytes),
        Err(error) => job.fail(format!("ipAddress encode: {error}")),
    }
}

/// Per-protocol reachability map. With no collectors built yet, the map
/// covers the configured protocols with every entry false (the "down"
/// form).
fn device_status(
    job: &mut Job,
    target: &Target,
    collectors: &HashMap<Protocol, Box<dyn ProtocolCollector>>,
) {
    let mut status: BTreeMap<String, bool> = BTreeMap::new();
    if collectors.is_empty() {
        for host in target.hosts.values() {
            for protocol in host.configs.keys() {
                status.insert(protocol.to_string(), false);
            }
        }
    } else {
        for (protocol, collector) in collectors {
            status.insert(protocol.to_string(), collector.online());
        }
    }
    match serde_json::to_vec(&status) {
        Ok(bytes) => job.succeed(bytes),
        Err(error) => job.fail(format!("deviceStatus encode: {error}")),
    }
}

#[cfg(test)]
#[path = "statics_tests.rs"]
mod tests;
