// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for protocol collectors.
//!
//! These never escape [`crate::ProtocolCollector::exec`]; they exist so the
//! internal helpers can use `?` before the collector serializes the failure
//! onto the job record.

use picket_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Collector used before `init` or after `disconnect`.
    #[error("not connected")]
    NotConnected,

    /// Unusable poll or host configuration.
    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Credential(#[from] CoreError),

    #[error("i/o: {0}")]
    Io(String),

    #[error("{what} timed out after {secs}s")]
    Timeout { what: String, secs: u64 },

    /// The remote answered, but with a protocol-level failure.
    #[error("protocol: {0}")]
    Protocol(String),
}
