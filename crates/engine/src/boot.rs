// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Boot-stage sequencing and boot-time device detailing.
//!
//! Before steady-state polling a host walks the ordered boot groups
//! (`BOOT_STAGE_00..04`). A stage is complete once every job it scheduled
//! has finished at least once; the next stage's pollaris bundles are then
//! loaded by group. The `systemMib` result yields the device sysObjectID,
//! which may select a device-specific detail bundle.

use crate::library::PollLibrary;
use crate::queue::JobsQueue;
use picket_core::poll::SYS_OBJECT_ID;
use picket_core::{Clock, DeviceClass, Job, JobKey, BOOT_STAGES};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Delay before a detail bundle's jobs join the queue.
pub(crate) const DETAIL_DELAY: Duration = Duration::from_secs(300);
/// Upper bound of the random pacing sleep between stages on simulators.
pub(crate) const STAGE_SMOOTHING_MAX: Duration = Duration::from_secs(300);

/// Per-host boot progress.
pub struct BootSequencer {
    stage: usize,
    pending: HashSet<JobKey>,
    started: bool,
    detail_loaded: bool,
}

impl BootSequencer {
    pub fn new() -> Self {
        Self { stage: 0, pending: HashSet::new(), started: false, detail_loaded: false }
    }

    /// Index of the stage currently collecting, or `None` after the last.
    pub fn stage(&self) -> Option<usize> {
        if self.stage < BOOT_STAGES.len() {
            Some(self.stage)
        } else {
            None
        }
    }

    /// Load the current stage's bundles into the queue and track their jobs.
    pub fn load_stage<C: Clock>(
        &mut self,
        library: &Arc<dyn PollLibrary>,
        queue: &JobsQueue<C>,
        class: &DeviceClass,
        target_id: &str,
        host_id: &str,
        links_id: &str,
    ) {
        let Some(stage) = self.stage() else { return };
        let group = BOOT_STAGES[stage];
        self.started = true;
        self.pending.clear();
        for pollaris in library.by_group(group, class) {
            queue.insert_pollaris(&pollaris, target_id, host_id, links_id);
            for poll in pollaris.polls.values() {
                if poll.cadence.enabled {
                    self.pending.insert(JobKey::new(pollaris.name.clone(), poll.name.clone()));
                }
            }
        }
        tracing::debug!(target_id, host = host_id, group, jobs = self.pending.len(), "boot stage loaded");
    }

    /// Mark one job of the current stage complete.
    pub fn record_completion(&mut self, key: &JobKey) {
        self.pending.remove(key);
    }

    /// All jobs of the current stage have completed at least once.
    pub fn is_complete(&self) -> bool {
        self.started && self.pending.is_empty()
    }

    /// Move to the next stage, if any remains.
    pub fn advance(&mut self) -> bool {
        if self.stage().is_none() {
            return false;
        }
        self.stage += 1;
        self.started = false;
        self.stage().is_some()
    }

    /// Whether the device-detail bundle has already been applied.
    pub fn detail_loaded(&self) -> bool {
        self.detail_loaded
    }

    pub fn set_detail_loaded(&mut self) {
        self.detail_loaded = true;
    }
}

impl Default for BootSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the device sysObjectID from a `systemMib` walk result.
pub fn sys_object_id(job: &Job) -> Option<String> {
    let bytes = job.result.as_deref()?;
    let map: BTreeMap<String, Vec<u8>> = serde_json::from_slice(bytes).ok()?;
    let value = map.get(SYS_OBJECT_ID)?;
    let text = String::from_utf8_lossy(value).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Schedule a detail bundle's jobs after [`DETAIL_DELAY`].
pub fn schedule_detail<C: Clock>(
    queue: Arc<JobsQueue<C>>,
    pollaris: picket_core::Pollaris,
    target_id: String,
    host_id: String,
    links_id: String,
) {
    tokio::spawn(async move {
        tokio::time::sleep(DETAIL_DELAY).await;
        tracing::info!(%target_id, host = %host_id, pollaris = %pollaris.name, "loading device detail polls");
        queue.insert_pollaris(&pollaris, &target_id, &host_id, &links_id);
    });
}

#[cfg(test)]
#[path = "boot_tests.rs"]
mod tests;
