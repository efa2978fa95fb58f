// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process bus: a [`Network`] of nodes sharing one registry.
//!
//! Each [`Network::node`] call yields a participant with its own uuid and
//! handler set. Dispatch semantics match the production substrate:
//! proximity prefers the local participant, round-robin rotates a shared
//! counter, requests run under the caller's deadline.

use crate::contract::{Bus, Handler, Verb};
use crate::error::BusError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

type ServiceKey = (String, u16);

#[derive(Default)]
struct Registry {
    /// Registration order is kept so round-robin rotation is stable.
    handlers: HashMap<ServiceKey, Vec<(Uuid, Arc<dyn Handler>)>>,
    rr_next: HashMap<ServiceKey, usize>,
}

/// A shared in-process fabric nodes attach to.
#[derive(Clone, Default)]
pub struct Network {
    registry: Arc<Mutex<Registry>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new participant.
    pub fn node(&self) -> LoopbackBus {
        LoopbackBus { registry: Arc::clone(&self.registry), uuid: Uuid::new_v4() }
    }
}

/// One participant on a loopback [`Network`].
#[derive(Clone)]
pub struct LoopbackBus {
    registry: Arc<Mutex<Registry>>,
    uuid: Uuid,
}

impl LoopbackBus {
    fn entries(&self, service: &str, area: u16) -> Vec<(Uuid, Arc<dyn Handler>)> {
        let registry = self.registry.lock();
        registry
            .handlers
            .get(&(service.to_string(), area))
            .cloned()
            .unwrap_or_default()
    }

    fn pick_round_robin(
        &self,
        service: &str,
        area: u16,
    ) -> Result<Arc<dyn Handler>, BusError> {
        let key = (service.to_string(), area);
        let mut registry = self.registry.lock();
        let entries = registry.handlers.get(&key).cloned().unwrap_or_default();
        if entries.is_empty() {
            return Err(BusError::NoParticipant { service: service.to_string(), area });
        }
        let next = registry.rr_next.entry(key).or_insert(0);
        let chosen = entries[*next % entries.len()].1.clone();
        *next = (*next + 1) % entries.len();
        Ok(chosen)
    }
}

#[async_trait]
impl Bus for LoopbackBus {
    fn local_uuid(&self) -> Uuid {
        self.uuid
    }

    fn register(&self, service: &str, area: u16, handler: Arc<dyn Handler>) {
        let key = (service.to_string(), area);
        let mut registry = self.registry.lock();
        let entries = registry.handlers.entry(key).or_default();
        entries.retain(|(uuid, _)| *uuid != self.uuid);
        entries.push((self.uuid, handler));
    }

    fn unregister(&self, service: &str, area: u16) {
        let key = (service.to_string(), area);
        let mut registry = self.registry.lock();
        if let Some(entries) = registry.handlers.get_mut(&key) {
            entries.retain(|(uuid, _)| *uuid != self.uuid);
        }
    }

    async fn multicast(
        &self,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        let entries = self.entries(service, area);
        if entries.is_empty() {
            return Err(BusError::NoParticipant { service: service.to_string(), area });
        }
        for (uuid, handler) in entries {
            if let Err(error) = handler.handle(verb, &payload).await {
                tracing::debug!(%uuid, service, %error, "multicast delivery failed");
            }
        }
        Ok(())
    }

    async fn round_robin(
        &self,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        let handler = self.pick_round_robin(service, area)?;
        handler.handle(verb, &payload).await.map(|_| ())
    }

    async fn proximity(
        &self,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
    ) -> Result<(), BusError> {
        let entries = self.entries(service, area);
        let nearest = entries
            .iter()
            .find(|(uuid, _)| *uuid == self.uuid)
            .or_else(|| entries.first())
            .map(|(_, handler)| handler.clone())
            .ok_or_else(|| BusError::NoParticipant { service: service.to_string(), area })?;
        nearest.handle(verb, &payload).await.map(|_| ())
    }

    async fn request(
        &self,
        to: Uuid,
        service: &str,
        area: u16,
        verb: Verb,
        payload: Vec<u8>,
        timeout_secs: u64,
    ) -> Result<Vec<u8>, BusError> {
        let handler = self
            .entries(service, area)
            .into_iter()
            .find(|(uuid, _)| *uuid == to)
            .map(|(_, handler)| handler)
            .ok_or(BusError::UnknownParticipant(to))?;
        tokio::time::timeout(Duration::from_secs(timeout_secs), handler.handle(verb, &payload))
            .await
            .map_err(|_| BusError::Timeout { service: service.to_string(), timeout_secs })?
    }

    fn participants(&self, service: &str, area: u16) -> Vec<Uuid> {
        self.entries(service, area).into_iter().map(|(uuid, _)| uuid).collect()
    }
}

#[cfg(test)]
#[path = "loopback_tests.rs"]
mod tests;
