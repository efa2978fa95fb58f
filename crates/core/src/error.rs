// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the core model.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("credential '{cred_id}' not found for purpose '{purpose}'")]
    CredentialNotFound { cred_id: String, purpose: String },

    #[error("pollaris '{0}' not found")]
    PollarisNotFound(String),

    #[error("pollaris '{0}' already registered")]
    PollarisExists(String),

    #[error("poll '{poll}' not found in pollaris '{pollaris}'")]
    PollNotFound { pollaris: String, poll: String },
}
