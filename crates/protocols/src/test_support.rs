// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes for collector tests in this crate and downstream crates
//! (enabled via the `test-support` feature).

use crate::collector::{ProtocolCollector, Resources};
use crate::error::CollectError;
use crate::snmp::{SnmpTransport, SnmpValue};
use crate::ssh::ShellLink;
use async_trait::async_trait;
use picket_core::{HostProtocol, Job, Poll, Protocol};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// In-memory SNMP agent over a sorted OID map.
#[derive(Default)]
pub struct FakeSnmpTransport {
    values: BTreeMap<String, SnmpValue>,
}

impl FakeSnmpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, oid: &str, value: SnmpValue) -> Self {
        self.values.insert(crate::snmp::oid::normalize(oid), value);
        self
    }

    pub fn with_str(self, oid: &str, text: &str) -> Self {
        self.with_value(oid, SnmpValue::Str(text.as_bytes().to_vec()))
    }
}

#[async_trait]
impl SnmpTransport for FakeSnmpTransport {
    async fn get(&self, oid: &str) -> Result<SnmpValue, CollectError> {
        self.values
            .get(oid)
            .cloned()
            .ok_or_else(|| CollectError::Protocol(format!("fake agent: no such object {oid}")))
    }

    async fn get_next(&self, oid: &str) -> Result<Option<(String, SnmpValue)>, CollectError> {
        Ok(self
            .values
            .range::<String, _>((
                std::ops::Bound::Excluded(oid.to_string()),
                std::ops::Bound::Unbounded,
            ))
            .next()
            .map(|(k, v)| (k.clone(), v.clone())))
    }
}

/// Scripted interactive shell: each written command queues its canned
/// response (in 512-byte chunks) for draining.
pub struct FakeShellLink {
    responses: HashMap<String, String>,
    pending: VecDeque<Vec<u8>>,
    pub writes: Vec<String>,
    closed: bool,
}

impl FakeShellLink {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            pending: VecDeque::new(),
            writes: Vec::new(),
            closed: false,
        }
    }

    /// Respond to `command` with `response` (the caller includes any
    /// prompt/echo text the device would emit).
    pub fn on_command(mut self, command: &str, response: &str) -> Self {
        self.responses.insert(command.to_string(), response.to_string());
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for FakeShellLink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShellLink for FakeShellLink {
    async fn write(&mut self, data: &[u8]) -> Result<(), CollectError> {
        let text = String::from_utf8_lossy(data).trim_end_matches('\n').to_string();
        self.writes.push(text.clone());
        if let Some(response) = self.responses.get(&text) {
            for chunk in response.as_bytes().chunks(512) {
                self.pending.push_back(chunk.to_vec());
            }
        }
        Ok(())
    }

    fn try_read(&mut self) -> Option<Vec<u8>> {
        self.pending.pop_front()
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Outcome counters shared with a [`StubCollector`] after it moves into a
/// host-collector task.
#[derive(Default)]
pub struct StubCounters {
    pub execs: AtomicU32,
    pub connects: AtomicU32,
    pub disconnects: AtomicU32,
}

enum StubBehavior {
    Succeed(Vec<Vec<u8>>),
    Fail(String),
}

/// Programmable protocol collector for scheduler tests.
pub struct StubCollector {
    protocol: Protocol,
    behavior: StubBehavior,
    counters: Arc<StubCounters>,
    online: Arc<AtomicBool>,
}

impl StubCollector {
    /// Succeeds every exec, cycling through `results` (the last repeats).
    pub fn returning(protocol: Protocol, results: Vec<Vec<u8>>) -> (Self, Arc<StubCounters>) {
        let counters = Arc::new(StubCounters::default());
        let collector = Self {
            protocol,
            behavior: StubBehavior::Succeed(results),
            counters: Arc::clone(&counters),
            online: Arc::new(AtomicBool::new(true)),
        };
        (collector, counters)
    }

    /// Fails every exec with `error`.
    pub fn failing(protocol: Protocol, error: &str) -> (Self, Arc<StubCounters>) {
        let counters = Arc::new(StubCounters::default());
        let collector = Self {
            protocol,
            behavior: StubBehavior::Fail(error.to_string()),
            counters: Arc::clone(&counters),
            online: Arc::new(AtomicBool::new(false)),
        };
        (collector, counters)
    }
}

#[async_trait]
impl ProtocolCollector for StubCollector {
    fn init(&mut self, _config: &HostProtocol, _resources: &Resources) -> Result<(), CollectError> {
        Ok(())
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn connect(&mut self) -> Result<(), CollectError> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    async fn exec(&mut self, _poll: &Poll, job: &mut Job) {
        let n = self.counters.execs.fetch_add(1, Ordering::SeqCst) as usize;
        match &self.behavior {
            StubBehavior::Succeed(results) => {
                let result = results
                    .get(n.min(results.len().saturating_sub(1)))
                    .cloned()
                    .unwrap_or_default();
                job.succeed(result);
            }
            StubBehavior::Fail(error) => job.fail(error.clone()),
        }
    }

    fn online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
