// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The contract every protocol implementation honors.

use crate::error::CollectError;
use async_trait::async_trait;
use picket_core::{CredentialStore, EngineConfig, HostProtocol, Job, Poll, Protocol};
use std::sync::Arc;

/// Ambient services handed to collectors at configuration time.
#[derive(Clone)]
pub struct Resources {
    pub credentials: Arc<dyn CredentialStore>,
    pub config: EngineConfig,
}

impl Resources {
    pub fn new(credentials: Arc<dyn CredentialStore>, config: EngineConfig) -> Self {
        Self { credentials, config }
    }
}

/// Uniform lifecycle and execution surface for any protocol.
///
/// A collector is owned by a single host collector and driven from that
/// host's loop task; implementations need no internal cross-task locking.
#[async_trait]
pub trait ProtocolCollector: Send + Sync {
    /// One-time configuration. Must not perform network I/O; local state
    /// allocation (e.g. writing a kubeconfig file) is allowed.
    fn init(&mut self, config: &HostProtocol, resources: &Resources) -> Result<(), CollectError>;

    /// Protocol identity.
    fn protocol(&self) -> Protocol;

    /// Establish or refresh connection state. Idempotent; `exec` calls it
    /// lazily, so explicit calls are optional.
    async fn connect(&mut self) -> Result<(), CollectError>;

    /// Release sockets, files, and tasks. Idempotent; safe after a partial
    /// `init`.
    async fn disconnect(&mut self);

    /// Execute the poll referenced by the job, mutating `result`, `error`
    /// and `error_count` in place. Never fails outward: every error becomes
    /// `job.error` plus an incremented `error_count`; success resets the
    /// streak.
    async fn exec(&mut self, poll: &Poll, job: &mut Job);

    /// Last-known reachability. Advisory; consumed by the `deviceStatus`
    /// static job.
    fn online(&self) -> bool;
}
