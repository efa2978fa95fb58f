// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll definitions and pollaris bundles.
//!
//! A [`Poll`] is an immutable probe definition; a [`Pollaris`] is a named
//! bundle of polls tagged with group names (boot stages) and device
//! classifiers (vendor/series/family/...). The engine treats pollaris
//! content as read-only keyed lookup.

use crate::target::Protocol;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pollaris group names executed in order before steady-state polling.
pub const BOOT_STAGES: [&str; 5] = [
    "BOOT_STAGE_00",
    "BOOT_STAGE_01",
    "BOOT_STAGE_02",
    "BOOT_STAGE_03",
    "BOOT_STAGE_04",
];

/// Built-in job executed by the host collector itself: first configured address.
pub const JOB_IP_ADDRESS: &str = "ipAddress";
/// Built-in job: per-protocol reachability map.
pub const JOB_DEVICE_STATUS: &str = "deviceStatus";
/// Boot poll whose result carries the device sysObjectID used for detailing.
pub const JOB_SYSTEM_MIB: &str = "systemMib";
/// OID of sysObjectID within the systemMib walk result.
pub const SYS_OBJECT_ID: &str = ".1.3.6.1.2.1.1.2.0";

/// SNMP operation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOp {
    /// Single get returning one value.
    Get,
    /// Walk returning an OID→bytes map.
    Map,
    /// Walk reshaped into rows and columns.
    Table,
}

crate::simple_display! {
    PollOp {
        Get => "get",
        Map => "map",
        Table => "table",
    }
}

/// Repetition intervals of a job.
///
/// `cadences` is a ring of interval lengths in seconds and `current` the
/// active slot. `startups` holds per-slot first-run jitter offsets, filled
/// lazily (`-1` = unset) when smoothed first collection is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub enabled: bool,
    pub cadences: Vec<u64>,
    #[serde(default)]
    pub current: usize,
    #[serde(default)]
    pub startups: Vec<i64>,
}

impl Cadence {
    pub fn new(intervals: Vec<u64>) -> Self {
        let startups = vec![-1; intervals.len()];
        Self { enabled: true, cadences: intervals, current: 0, startups }
    }

    /// Interval of the active slot, in seconds.
    pub fn interval(&self) -> u64 {
        self.cadences.get(self.current).copied().unwrap_or(0)
    }

    /// Startup jitter offset for the active slot, `None` until assigned.
    pub fn startup(&self) -> Option<i64> {
        match self.startups.get(self.current) {
            Some(v) if *v >= 0 => Some(*v),
            _ => None,
        }
    }

    /// Assign the startup jitter offset for the active slot.
    pub fn set_startup(&mut self, offset: i64) {
        if self.startups.len() < self.cadences.len() {
            self.startups.resize(self.cadences.len(), -1);
        }
        if let Some(slot) = self.startups.get_mut(self.current) {
            *slot = offset;
        }
    }
}

/// Immutable probe definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub name: String,
    pub protocol: Protocol,
    /// Protocol-specific command: OID, CLI command, `METHOD::path::body`,
    /// GraphQL query, or kubectl arguments.
    pub what: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<PollOp>,
    pub cadence: Cadence,
    /// Per-poll deadline in seconds. Zero means the host timeout applies.
    #[serde(default)]
    pub timeout_secs: u64,
    /// Registered response type name for typed RPCs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resp_name: Option<String>,
    /// Registered request-body type name (REST).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_name: Option<String>,
    /// Forward the result even when unchanged.
    #[serde(default)]
    pub always: bool,
}

/// Device-classification keys a pollaris is tagged with.
///
/// Empty strings act as wildcards during matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceClass {
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub software: String,
    #[serde(default)]
    pub hardware: String,
    #[serde(default)]
    pub version: String,
}

impl DeviceClass {
    /// True when every non-empty key of `want` matches this class.
    pub fn matches(&self, want: &DeviceClass) -> bool {
        fn key_matches(have: &str, want: &str) -> bool {
            want.is_empty() || have == want
        }
        key_matches(&self.vendor, &want.vendor)
            && key_matches(&self.series, &want.series)
            && key_matches(&self.family, &want.family)
            && key_matches(&self.software, &want.software)
            && key_matches(&self.hardware, &want.hardware)
            && key_matches(&self.version, &want.version)
    }
}

/// A named bundle of polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pollaris {
    pub name: String,
    /// Group tags, e.g. boot-stage identifiers.
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub class: DeviceClass,
    #[serde(default)]
    pub polls: HashMap<String, Poll>,
}

impl Pollaris {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            class: DeviceClass::default(),
            polls: HashMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn with_poll(mut self, poll: Poll) -> Self {
        self.polls.insert(poll.name.clone(), poll);
        self
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

crate::test_builder! {
    pub struct PollBuilder => Poll {
        text {
            name = "sysDescr",
            what = ".1.3.6.1.2.1.1.1.0",
        }
        value {
            protocol: Protocol = Protocol::SnmpV2c,
            operation: Option<PollOp> = Some(PollOp::Get),
            cadence: Cadence = Cadence::new(vec![60]),
            timeout_secs: u64 = 0,
            always: bool = false,
        }
        unset {
            resp_name: String,
            body_name: String,
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
