// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! picket-protocols: protocol collectors for the Picket engine.
//!
//! Every protocol implementation honors one contract
//! ([`ProtocolCollector`]): configure once, connect lazily, execute jobs
//! without ever letting an error escape — failures land on the job record.

pub mod args;
pub mod collector;
pub mod error;
pub mod graphql;
pub mod kubectl;
pub mod rest;
pub mod snmp;
pub mod ssh;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use args::substitute_args;
pub use collector::{ProtocolCollector, Resources};
pub use error::CollectError;
pub use graphql::GraphQlCollector;
pub use kubectl::KubectlCollector;
pub use rest::RestCollector;
pub use snmp::SnmpCollector;
pub use ssh::SshCollector;
