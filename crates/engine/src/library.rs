// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll-library contract: the keyed, read-only pollaris repository.
//!
//! The production repository is an external service; the engine consumes
//! this trait. Device-detail bundles are registered under their sysObjectID
//! as the pollaris name, which is how boot-time detailing finds them.

use picket_core::poll::{JOB_DEVICE_STATUS, JOB_IP_ADDRESS, JOB_SYSTEM_MIB};
use picket_core::{
    Cadence, CoreError, DeviceClass, Job, Poll, PollOp, Pollaris, Protocol, BOOT_STAGES,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub trait PollLibrary: Send + Sync + 'static {
    /// The poll definition a job references.
    fn poll(&self, pollaris: &str, job: &Job) -> Result<Poll, CoreError>;

    /// All pollaris bundles tagged with `group` whose classifiers match.
    fn by_group(&self, group: &str, class: &DeviceClass) -> Vec<Pollaris>;

    /// The bundle registered under `name`, when its classifiers match.
    fn by_key(&self, name: &str, class: &DeviceClass) -> Option<Pollaris>;

    /// Register a bundle, failing if the name is taken.
    fn add(&self, pollaris: Pollaris) -> Result<(), CoreError>;

    /// Register or replace a bundle.
    fn post(&self, pollaris: Pollaris);
}

/// In-memory library used by tests, sims and single-process deployments.
#[derive(Clone, Default)]
pub struct MemoryPollLibrary {
    entries: Arc<RwLock<HashMap<String, Pollaris>>>,
}

impl MemoryPollLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, pollaris: Pollaris) -> Self {
        self.post(pollaris);
        self
    }
}

impl PollLibrary for MemoryPollLibrary {
    fn poll(&self, pollaris: &str, job: &Job) -> Result<Poll, CoreError> {
        let entries = self.entries.read();
        let bundle = entries
            .get(pollaris)
            .ok_or_else(|| CoreError::PollarisNotFound(pollaris.to_string()))?;
        bundle.polls.get(&job.name).cloned().ok_or_else(|| CoreError::PollNotFound {
            pollaris: pollaris.to_string(),
            poll: job.name.clone(),
        })
    }

    fn by_group(&self, group: &str, class: &DeviceClass) -> Vec<Pollaris> {
        let mut bundles: Vec<Pollaris> = self
            .entries
            .read()
            .values()
            .filter(|p| p.in_group(group) && p.class.matches(class))
            .cloned()
            .collect();
        bundles.sort_by(|a, b| a.name.cmp(&b.name));
        bundles
    }

    fn by_key(&self, name: &str, class: &DeviceClass) -> Option<Pollaris> {
        self.entries.read().get(name).filter(|p| p.class.matches(class)).cloned()
    }

    fn add(&self, pollaris: Pollaris) -> Result<(), CoreError> {
        let mut entries = self.entries.write();
        if entries.contains_key(&pollaris.name) {
            return Err(CoreError::PollarisExists(pollaris.name));
        }
        entries.insert(pollaris.name.clone(), pollaris);
        Ok(())
    }

    fn post(&self, pollaris: Pollaris) {
        self.entries.write().insert(pollaris.name.clone(), pollaris);
    }
}

/// The built-in first boot stage: address, liveness, and the system walk
/// that yields the sysObjectID for device detailing.
pub fn boot_stage_pollaris(cadence_secs: u64) -> Pollaris {
    let cadence = || Cadence::new(vec![cadence_secs]);
    Pollaris::new("boot-base")
        .with_group(BOOT_STAGES[0])
        .with_poll(Poll {
            name: JOB_IP_ADDRESS.to_string(),
            protocol: Protocol::SnmpV2c,
            what: String::new(),
            operation: None,
            cadence: cadence(),
            timeout_secs: 0,
            resp_name: None,
            body_name: None,
            always: false,
        })
        .with_poll(Poll {
            name: JOB_DEVICE_STATUS.to_string(),
            protocol: Protocol::SnmpV2c,
            what: String::new(),
            operation: None,
            cadence: cadence(),
            timeout_secs: 0,
            resp_name: None,
            body_name: None,
            always: true,
        })
        .with_poll(Poll {
            name: JOB_SYSTEM_MIB.to_string(),
            protocol: Protocol::SnmpV2c,
            what: ".1.3.6.1.2.1.1".to_string(),
            operation: Some(PollOp::Map),
            cadence: cadence(),
            timeout_secs: 0,
            resp_name: None,
            body_name: None,
            always: false,
        })
}

#[cfg(test)]
#[path = "library_tests.rs"]
mod tests;
