// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine services.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The host collector's loop has exited; the job was not executed.
    #[error("host collector for '{0}' is stopped")]
    Stopped(String),
}
