// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dispatch primitives the runtime provides to the engine.

use crate::error::BusError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// HTTP-style verb carried with every dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        })
    }
}

/// A service endpoint exposed on the bus.
///
/// Handlers run on the bus's dispatch task; they must not block.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn handle(&self, verb: Verb, payload: &[u8]) -> Result<Vec<u8>, BusError>;
}

/// Dispatch primitives the engine consumes.
///
/// `service` names a logical endpoint; `area` partitions the cluster so the
/// same service can run in isolated groups. Participants are identified by
/// process-unique uuids.
#[async_trait]
pub trait Bus: Send + Sync + 'static {
    /// This process's participant uuid.
    fn local_uuid(&self) -> Uuid;

    /// Expose a handler under `(service, area)` for this participant.
    fn register(&self, service: &str, area: u16, handler: Arc<dyn Handler>);

    /// Remove this participant's handler for `(service, area)`.
    fn unregister(&self, service: &str, area: u16);

    /// Deliver to every participant of `(service, area)`.
    async fn multicast(
        &self,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
    ) -> Result<(), BusError>;

    /// Deliver to one participant chosen round-robin.
    async fn round_robin(
        &self,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
    ) -> Result<(), BusError>;

    /// Deliver to the nearest participant (the local one when present).
    async fn proximity(
        &self,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
    ) -> Result<(), BusError>;

    /// Point-to-point request/response with a per-call deadline.
    async fn request(
        &self,
        to: Uuid,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
        timeout_secs: u64,
    ) -> Result<Vec<u8>, BusError>;

    /// Participant uuids currently exposing `(service, area)`.
    fn participants(&self, service: &str, area: u16) -> Vec<Uuid>;
}
