// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration carried on a shared context rather than globals.

use serde::{Deserialize, Serialize};

/// Tuning knobs shared by the scheduler and host collectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Spread each job's first collection uniformly across its cadence
    /// window instead of firing everything at startup.
    #[serde(default)]
    pub smooth_first_collection: bool,
    /// Pace boot-stage transitions with a random delay of up to five
    /// minutes, for multi-device simulators.
    #[serde(default)]
    pub smooth_for_simulators: bool,
    /// Consecutive failures after which a job is disabled.
    #[serde(default = "default_max_failures")]
    pub max_job_failures: u32,
}

fn default_max_failures() -> u32 {
    crate::job::MAX_JOB_FAILURES
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smooth_first_collection: false,
            smooth_for_simulators: false,
            max_job_failures: default_max_failures(),
        }
    }
}
