// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire transport behind the SNMP collector.
//!
//! The walk and shaping logic only needs `get` and `get_next`; isolating
//! them behind a trait keeps that logic testable and confines the client
//! library to one adapter.

use crate::error::CollectError;
use async_trait::async_trait;
use csnmp::{ObjectIdentifier, ObjectValue, Snmp2cClient};
use std::net::SocketAddr;
use std::time::Duration;

/// A decoded SNMP varbind value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnmpValue {
    Int(i64),
    Counter(u64),
    Ticks(u64),
    Str(Vec<u8>),
    Oid(String),
    Ip(String),
    Bytes(Vec<u8>),
    Null,
}

impl SnmpValue {
    /// Byte form stored in walk maps and forwarded downstream.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Int(v) => v.to_string().into_bytes(),
            Self::Counter(v) => v.to_string().into_bytes(),
            Self::Ticks(v) => v.to_string().into_bytes(),
            Self::Str(v) => v,
            Self::Oid(v) => v.into_bytes(),
            Self::Ip(v) => v.into_bytes(),
            Self::Bytes(v) => v,
            Self::Null => Vec::new(),
        }
    }
}

/// Minimal wire surface the collector drives.
#[async_trait]
pub trait SnmpTransport: Send + Sync {
    async fn get(&self, oid: &str) -> Result<SnmpValue, CollectError>;

    /// The lexicographically next varbind, or `None` when the view is
    /// exhausted (end-of-MIB / no-such-object / no-such-instance).
    async fn get_next(&self, oid: &str) -> Result<Option<(String, SnmpValue)>, CollectError>;
}

/// [`SnmpTransport`] over the pure-Rust `csnmp` client.
///
/// The client is thread-safe, so no process-wide serialization of SNMP
/// calls is needed.
pub struct CsnmpTransport {
    client: Snmp2cClient,
    target: String,
}

impl CsnmpTransport {
    pub async fn connect(
        addr: &str,
        port: u16,
        community: &str,
        timeout_secs: u64,
    ) -> Result<Self, CollectError> {
        let target = format!("{addr}:{port}");
        let sock_addr = resolve(&target).await?;
        let client = Snmp2cClient::new(
            sock_addr,
            community.as_bytes().to_vec(),
            None,
            Some(Duration::from_secs(timeout_secs)),
        )
        .await
        .map_err(|e| CollectError::Io(format!("snmp {target}: {e}")))?;
        Ok(Self { client, target })
    }

    fn parse_oid(&self, oid: &str) -> Result<ObjectIdentifier, CollectError> {
        oid.trim_start_matches('.')
            .parse()
            .map_err(|e| CollectError::Config(format!("snmp {}: bad OID '{oid}': {e}", self.target)))
    }
}

async fn resolve(target: &str) -> Result<SocketAddr, CollectError> {
    if let Ok(sock_addr) = target.parse() {
        return Ok(sock_addr);
    }
    tokio::net::lookup_host(target)
        .await
        .map_err(|e| CollectError::Io(format!("snmp resolve {target}: {e}")))?
        .next()
        .ok_or_else(|| CollectError::Io(format!("snmp resolve {target}: no address")))
}

fn convert(value: ObjectValue) -> SnmpValue {
    match value {
        ObjectValue::Integer(v) => SnmpValue::Int(i64::from(v)),
        ObjectValue::String(v) => SnmpValue::Str(v),
        ObjectValue::ObjectId(v) => SnmpValue::Oid(format!(".{v}")),
        ObjectValue::IpAddress(v) => SnmpValue::Ip(v.to_string()),
        ObjectValue::Counter32(v) => SnmpValue::Counter(u64::from(v)),
        ObjectValue::Unsigned32(v) => SnmpValue::Counter(u64::from(v)),
        ObjectValue::TimeTicks(v) => SnmpValue::Ticks(u64::from(v)),
        ObjectValue::Opaque(v) => SnmpValue::Bytes(v),
        ObjectValue::Counter64(v) => SnmpValue::Counter(v),
        #[allow(unreachable_patterns)]
        _ => SnmpValue::Null,
    }
}

/// True for the error shapes that mean "nothing further to read" rather
/// than a failed exchange.
fn is_view_exhausted(error: &csnmp::SnmpClientError) -> bool {
    let text = error.to_string();
    text.contains("EndOfMibView")
        || text.contains("NoSuchObject")
        || text.contains("NoSuchInstance")
}

#[async_trait]
impl SnmpTransport for CsnmpTransport {
    async fn get(&self, oid: &str) -> Result<SnmpValue, CollectError> {
        let parsed = self.parse_oid(oid)?;
        self.client
            .get(parsed)
            .await
            .map(convert)
            .map_err(|e| CollectError::Protocol(format!("snmp {} get {oid}: {e}", self.target)))
    }

    async fn get_next(&self, oid: &str) -> Result<Option<(String, SnmpValue)>, CollectError> {
        let parsed = self.parse_oid(oid)?;
        match self.client.get_next(parsed).await {
            Ok((next_oid, value)) => Ok(Some((format!(".{next_oid}"), convert(value)))),
            Err(e) if is_view_exhausted(&e) => Ok(None),
            Err(e) => Err(CollectError::Protocol(format!(
                "snmp {} getnext {oid}: {e}",
                self.target
            ))),
        }
    }
}
