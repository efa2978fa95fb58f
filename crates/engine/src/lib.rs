// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! picket-engine: the per-host collection engine and its cluster services.
//!
//! Targets arrive over the bus; each host gets one background loop that
//! pops cadence-ready jobs, drives the matching protocol collector, runs
//! change detection, and forwards changed artifacts to the target's parser
//! link. Boot stages classify a device before steady-state polling.

pub mod boot;
pub mod error;
pub mod exec;
pub mod host;
pub mod library;
pub mod queue;
pub mod service;
pub mod statics;

pub use error::EngineError;
pub use exec::ExecService;
pub use host::{build_collectors, CollectorSet, HostCollector, HostContext};
pub use library::{boot_stage_pollaris, MemoryPollLibrary, PollLibrary};
pub use queue::{JobsQueue, Popped};
pub use service::{CollectorService, COLLECTOR_SERVICE, EXEC_SERVICE};
