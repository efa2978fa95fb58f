// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Live scheduling record for one poll against one host.

use crate::poll::Cadence;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Consecutive failures after which a job is disabled until re-inserted.
pub const MAX_JOB_FAILURES: u32 = 5;

/// Unique key of a job inside one queue: pollaris name + poll name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub pollaris: String,
    pub name: String,
}

impl JobKey {
    pub fn new(pollaris: impl Into<String>, name: impl Into<String>) -> Self {
        Self { pollaris: pollaris.into(), name: name.into() }
    }
}

impl std::fmt::Display for JobKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pollaris, self.name)
    }
}

/// Fleet-map key: target + host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostKey {
    pub target_id: String,
    pub host_id: String,
}

impl HostKey {
    pub fn new(target_id: impl Into<String>, host_id: impl Into<String>) -> Self {
        Self { target_id: target_id.into(), host_id: host_id.into() }
    }
}

impl std::fmt::Display for HostKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.target_id, self.host_id)
    }
}

/// A runtime job instance.
///
/// `ended == 0` means "never yet run": the full cadence has elapsed since
/// epoch, so the job is immediately eligible. Once a run completes,
/// `ended >= started` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub target_id: String,
    pub host_id: String,
    /// Downstream parser link for this job's artifacts.
    pub links_id: String,
    pub pollaris: String,
    pub name: String,
    pub cadence: Cadence,
    #[serde(default)]
    pub timeout_secs: u64,
    /// Template-substitution arguments (`$name` tokens in the poll body).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub arguments: HashMap<String, String>,
    #[serde(default)]
    pub started: u64,
    #[serde(default)]
    pub ended: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default)]
    pub error_count: u32,
    /// Forward the result even when unchanged.
    #[serde(default)]
    pub always: bool,
}

impl Job {
    pub fn key(&self) -> JobKey {
        JobKey::new(self.pollaris.clone(), self.name.clone())
    }

    pub fn host_key(&self) -> HostKey {
        HostKey::new(self.target_id.clone(), self.host_id.clone())
    }

    /// Begin a run: stash the previous result (unless the last run failed),
    /// stamp `started`, and clear the completion state.
    pub fn mark_start(&mut self, now: u64) {
        if self.error_count == 0 {
            self.last_result = self.result.take();
        }
        self.started = now;
        self.ended = 0;
        self.result = None;
        self.error.clear();
    }

    /// Stamp the completion time.
    pub fn mark_ended(&mut self, now: u64) {
        self.ended = now;
    }

    /// Record a successful execution, resetting the failure streak.
    pub fn succeed(&mut self, result: Vec<u8>) {
        self.result = Some(result);
        self.error.clear();
        self.error_count = 0;
    }

    /// Record a failed execution.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = error.into();
        self.error_count += 1;
    }

    /// Byte-wise change detection between this run and the previous one.
    ///
    /// Two absent results are unchanged; absent vs present is a change.
    pub fn has_change(&self) -> bool {
        match (&self.result, &self.last_result) {
            (None, None) => false,
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }
}

crate::test_builder! {
    pub struct JobBuilder => Job {
        text {
            target_id = "10.0.0.1",
            host_id = "10.0.0.1",
            links_id = "parser",
            pollaris = "mib2",
            name = "sysDescr",
            error = "",
        }
        value {
            cadence: Cadence = Cadence::new(vec![60]),
            timeout_secs: u64 = 0,
            arguments: HashMap<String, String> = HashMap::new(),
            started: u64 = 0,
            ended: u64 = 0,
            error_count: u32 = 0,
            always: bool = false,
        }
        unset {
            result: Vec<u8>,
            last_result: Vec<u8>,
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
