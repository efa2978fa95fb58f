// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for tests in this crate and downstream crates
//! (enabled via the `test-support` feature).

use crate::creds::{MemoryCredentials, Purpose};
use crate::poll::{Cadence, Poll, PollOp, Pollaris};
use crate::target::{Host, HostProtocol, Protocol, Target};

/// A single-host SNMP target the way the simulators configure one.
pub fn snmp_target(addr: &str) -> Target {
    let config = HostProtocol {
        protocol: Protocol::SnmpV2c,
        addr: addr.to_string(),
        port: 161,
        timeout_secs: 5,
        cred_id: "sim".to_string(),
        terminal: None,
        terminal_commands: Vec::new(),
        prompts: Vec::new(),
        http_prefix: None,
        cert: None,
        auth: None,
    };
    let host = Host {
        host_id: addr.to_string(),
        configs: [(Protocol::SnmpV2c, config)].into_iter().collect(),
    };
    Target::new(addr, "parser").with_host(host)
}

/// Credential store preloaded with the simulator community.
pub fn sim_credentials() -> MemoryCredentials {
    let creds = MemoryCredentials::new();
    creds.insert("sim", Purpose::Snmp, "", "public");
    creds.insert("sim", Purpose::Ssh, "admin", "admin");
    creds
}

/// A one-poll SNMP pollaris with the given cadence.
pub fn snmp_pollaris(name: &str, poll_name: &str, oid: &str, cadence_secs: u64) -> Pollaris {
    Pollaris::new(name).with_poll(Poll {
        name: poll_name.to_string(),
        protocol: Protocol::SnmpV2c,
        what: oid.to_string(),
        operation: Some(PollOp::Get),
        cadence: Cadence::new(vec![cadence_secs]),
        timeout_secs: 0,
        resp_name: None,
        body_name: None,
        always: false,
    })
}

/// Proptest strategies shared across crates.
pub mod strategies {
    use proptest::prelude::*;

    /// Arbitrary result payloads, biased toward short buffers.
    pub fn result_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 0..32)
    }
}
