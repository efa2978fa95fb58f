// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Targets, hosts, and per-protocol connection descriptors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wire protocol used to reach a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Ssh,
    SnmpV2c,
    Kubectl,
    Restconf,
    GraphQl,
}

crate::simple_display! {
    Protocol {
        Ssh => "ssh",
        SnmpV2c => "snmpv2c",
        Kubectl => "kubectl",
        Restconf => "restconf",
        GraphQl => "graphql",
    }
}

/// Per-protocol connection descriptor for one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProtocol {
    pub protocol: Protocol,
    pub addr: String,
    pub port: u16,
    /// Per-call deadline in seconds. Zero means the protocol default.
    #[serde(default)]
    pub timeout_secs: u64,
    /// Opaque handle resolved by the credential store.
    pub cred_id: String,
    /// Request a PTY of this terminal type (SSH).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
    /// Commands written to the shell right after connect (SSH).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terminal_commands: Vec<String>,
    /// Command-complete terminator strings (SSH). Empty means the default `#`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompts: Vec<String>,
    /// URL prefix for HTTP-based protocols (REST, GraphQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_prefix: Option<String>,
    /// PEM certificate material for TLS endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    /// Protocol-specific auth descriptor (e.g. token scheme for REST).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl HostProtocol {
    /// Effective per-call deadline, falling back to the 60s default.
    pub fn timeout_or_default(&self) -> u64 {
        if self.timeout_secs == 0 {
            60
        } else {
            self.timeout_secs
        }
    }
}

/// A physical or logical endpoint addressable by one or more protocols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub host_id: String,
    #[serde(default)]
    pub configs: HashMap<Protocol, HostProtocol>,
}

/// A polled entity owning one or more hosts (typically one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub target_id: String,
    /// Selects the downstream parser service-link for this target's artifacts.
    pub links_id: String,
    #[serde(default)]
    pub hosts: HashMap<String, Host>,
}

impl Target {
    pub fn new(target_id: impl Into<String>, links_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            links_id: links_id.into(),
            hosts: HashMap::new(),
        }
    }

    pub fn with_host(mut self, host: Host) -> Self {
        self.hosts.insert(host.host_id.clone(), host);
        self
    }

    /// First configured address across hosts and configs, if any.
    ///
    /// Iteration order over maps is unspecified; callers only rely on this
    /// when a target has a single host and config (the common case).
    pub fn first_addr(&self) -> Option<&str> {
        self.hosts
            .values()
            .flat_map(|h| h.configs.values())
            .map(|c| c.addr.as_str())
            .next()
    }
}

crate::test_builder! {
    pub struct HostProtocolBuilder => HostProtocol {
        text {
            addr = "127.0.0.1",
            cred_id = "test-cred",
        }
        value {
            protocol: Protocol = Protocol::SnmpV2c,
            port: u16 = 161,
            timeout_secs: u64 = 5,
            terminal_commands: Vec<String> = Vec::new(),
            prompts: Vec<String> = Vec::new(),
        }
        unset {
            terminal: String,
            http_prefix: String,
            cert: String,
            auth: String,
        }
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
