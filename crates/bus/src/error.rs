// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for bus dispatch.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    #[error("no participant for service '{service}' area {area}")]
    NoParticipant { service: String, area: u16 },

    #[error("participant {0} not found")]
    UnknownParticipant(uuid::Uuid),

    #[error("request to '{service}' timed out after {timeout_secs}s")]
    Timeout { service: String, timeout_secs: u64 },

    #[error("handler failed: {0}")]
    Handler(String),

    #[error("payload codec: {0}")]
    Codec(String),
}
