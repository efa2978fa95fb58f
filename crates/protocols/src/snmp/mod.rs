// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SNMP v2c collector: get / walk / table with a net-snmp CLI fallback.

pub mod fallback;
pub mod oid;
pub mod shape;
pub mod transport;

pub use shape::{SnmpRow, SnmpTable};
pub use transport::{SnmpTransport, SnmpValue};

use crate::collector::{ProtocolCollector, Resources};
use crate::error::CollectError;
use async_trait::async_trait;
use fallback::FallbackOp;
use picket_core::{HostProtocol, Job, Poll, PollOp, Protocol, Purpose};
use std::collections::BTreeMap;
use std::time::Duration;
use transport::CsnmpTransport;

/// Session parameters resolved at init time.
#[derive(Clone)]
struct Session {
    addr: String,
    port: u16,
    community: String,
    timeout_secs: u64,
}

pub struct SnmpCollector {
    session: Option<Session>,
    transport: Option<Box<dyn SnmpTransport>>,
    online: bool,
}

impl SnmpCollector {
    pub fn new() -> Self {
        Self { session: None, transport: None, online: false }
    }

    /// Build a collector over a pre-connected transport (tests and sims).
    #[cfg(any(test, feature = "test-support"))]
    pub fn with_transport(transport: Box<dyn SnmpTransport>) -> Self {
        Self {
            session: Some(Session {
                addr: "test".to_string(),
                port: 161,
                community: "public".to_string(),
                timeout_secs: 5,
            }),
            transport: Some(transport),
            online: false,
        }
    }

    fn session(&self) -> Result<&Session, CollectError> {
        self.session.as_ref().ok_or(CollectError::NotConnected)
    }

    /// Iterative get-next walk from the parsed root.
    ///
    /// Stops when the returned OID leaves the root subtree, the view is
    /// exhausted, or the agent repeats an OID (loop guard). An empty walk
    /// is an error.
    async fn walk(&self, root: &str) -> Result<BTreeMap<String, SnmpValue>, CollectError> {
        let transport = self.transport.as_ref().ok_or(CollectError::NotConnected)?;
        let session = self.session()?;
        let root = oid::normalize(root);
        let mut map = BTreeMap::new();
        let mut current = root.clone();
        loop {
            let Some((next, value)) = transport.get_next(&current).await? else {
                break;
            };
            let next = oid::normalize(&next);
            if !oid::in_subtree(&root, &next) || next == current {
                break;
            }
            map.insert(next.clone(), value);
            current = next;
        }
        if map.is_empty() {
            return Err(CollectError::Protocol(format!(
                "snmp {}:{} walk {root}: no PDUs returned",
                session.addr, session.port
            )));
        }
        Ok(map)
    }

    async fn run_operation(&mut self, poll: &Poll) -> Result<Vec<u8>, CollectError> {
        self.connect().await?;
        let what = oid::normalize(&poll.what);
        match poll.operation.unwrap_or(PollOp::Get) {
            PollOp::Get => {
                let transport = self.transport.as_ref().ok_or(CollectError::NotConnected)?;
                Ok(transport.get(&what).await?.into_bytes())
            }
            PollOp::Map => {
                let map = byte_map(self.walk(&what).await?);
                serde_json::to_vec(&map).map_err(|e| CollectError::Io(e.to_string()))
            }
            PollOp::Table => {
                let table = shape::shape_table(self.walk(&what).await?);
                serde_json::to_vec(&table).map_err(|e| CollectError::Io(e.to_string()))
            }
        }
    }

    /// Deadline-expired path: shell out to the net-snmp tools.
    async fn run_fallback(&self, poll: &Poll) -> Result<Vec<u8>, CollectError> {
        let session = self.session()?.clone();
        let what = oid::normalize(&poll.what);
        let op = match poll.operation.unwrap_or(PollOp::Get) {
            PollOp::Get => FallbackOp::Get,
            PollOp::Map | PollOp::Table => FallbackOp::Walk,
        };
        let map = fallback::run(
            op,
            &session.addr,
            session.port,
            &session.community,
            session.timeout_secs,
            &what,
        )
        .await?;
        match poll.operation.unwrap_or(PollOp::Get) {
            PollOp::Get => {
                let value = map.into_values().next().unwrap_or(SnmpValue::Null);
                Ok(value.into_bytes())
            }
            PollOp::Map => serde_json::to_vec(&byte_map(map))
                .map_err(|e| CollectError::Io(e.to_string())),
            PollOp::Table => serde_json::to_vec(&shape::shape_table(map))
                .map_err(|e| CollectError::Io(e.to_string())),
        }
    }

    fn deadline(&self, poll: &Poll, job: &Job) -> u64 {
        if poll.timeout_secs > 0 {
            poll.timeout_secs
        } else if job.timeout_secs > 0 {
            job.timeout_secs
        } else {
            self.session.as_ref().map(|s| s.timeout_secs).unwrap_or(60)
        }
    }
}

impl Default for SnmpCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk map in its downstream byte form.
fn byte_map(map: BTreeMap<String, SnmpValue>) -> BTreeMap<String, Vec<u8>> {
    map.into_iter().map(|(k, v)| (k, v.into_bytes())).collect()
}

#[async_trait]
impl ProtocolCollector for SnmpCollector {
    fn init(&mut self, config: &HostProtocol, resources: &Resources) -> Result<(), CollectError> {
        let cred = resources.credentials.credential(&config.cred_id, Purpose::Snmp)?;
        self.session = Some(Session {
            addr: config.addr.clone(),
            port: config.port,
            community: cred.secret,
            timeout_secs: config.timeout_or_default(),
        });
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        Protocol::SnmpV2c
    }

    async fn connect(&mut self) -> Result<(), CollectError> {
        if self.transport.is_some() {
            return Ok(());
        }
        let session = self.session()?.clone();
        let transport = CsnmpTransport::connect(
            &session.addr,
            session.port,
            &session.community,
            session.timeout_secs,
        )
        .await?;
        self.transport = Some(Box::new(transport));
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.transport = None;
        self.online = false;
    }

    async fn exec(&mut self, poll: &Poll, job: &mut Job) {
        let secs = self.deadline(poll, job);
        let outcome =
            tokio::time::timeout(Duration::from_secs(secs), self.run_operation(poll)).await;
        match outcome {
            Ok(Ok(bytes)) => {
                self.online = true;
                job.succeed(bytes);
            }
            Ok(Err(error)) => {
                self.online = false;
                job.fail(error.to_string());
            }
            Err(_) => {
                tracing::debug!(
                    job = %job.key(),
                    oid = %poll.what,
                    "snmp deadline expired, trying cli fallback"
                );
                match self.run_fallback(poll).await {
                    Ok(bytes) => {
                        self.online = true;
                        job.succeed(bytes);
                    }
                    Err(error) => {
                        self.online = false;
                        job.fail(error.to_string());
                    }
                }
            }
        }
    }

    fn online(&self) -> bool {
        self.online
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
